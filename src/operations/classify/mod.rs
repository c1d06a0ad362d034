//! Point and topology classification between shells.
//!
//! The point queries answer where a single point lies relative to a face
//! or a closed shell. [`ShellClassifier`] lifts them to every vertex, edge
//! and loop of a shell, recording the verdicts in a
//! [`ClassificationCache`].

mod cache;
mod class;
mod loop_identity;
mod loop_in_loop;
mod point_in_face;
mod point_in_shell;
mod propagate;

pub use cache::ClassificationCache;
pub use class::Classification;
pub use loop_identity::{loops_identical, LoopIdentity};
pub use loop_in_loop::{classify_loop_in_face, classify_loop_in_loop};
pub use point_in_face::{
    classify_point_in_face, classify_point_in_face_except, classify_point_in_loop,
};
pub use point_in_shell::{
    classify_point_in_shell, classify_point_in_shell_with, RayCastOptions, PROBE_COUNT,
};
pub use propagate::{classify_shells, classify_shells_with, ClassifyOptions, ShellClassifier};
