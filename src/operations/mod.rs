pub mod classify;
pub mod creation;
