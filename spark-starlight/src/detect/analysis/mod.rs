pub mod compose;
mod object_detected_describer;
mod wall_describer;
#[macro_use]
mod dispatch_macro;

pub use compose::CompositeDescriber;
pub use object_detected_describer::{describe_nearest, NearestObjectDescriber};
pub use wall_describer::WallDescriber;

use crate::pipeline::FrameResult;

/// Produces one spoken *part* of a frame summary.
pub trait Describer {
    /// Returns Some(description_part) if relevant, None otherwise.
    fn describe(&self, result: &FrameResult) -> Option<String>;
}

define_describer![
    NearestObjects => NearestObjectDescriber,
    Walls => WallDescriber,
];
