pub mod error;
pub mod math;
pub mod operations;
pub mod topology;

pub use error::{ClassifyError, Result};
pub use math::Tolerance;
pub use operations::classify::{classify_shells, Classification, ClassificationCache};
pub use topology::Model;
