//! Boundary of the external perception models.
//!
//! The depth estimator and the object detectors are owned elsewhere; this
//! crate only fixes what goes in and what comes out of them.

pub mod inference;
pub mod utils;

pub use inference::depth::DepthInference;
pub use inference::detect::{DetectInference, DetectMask, DetectResult};
pub use utils::graph::{BoundingBox, Point};
