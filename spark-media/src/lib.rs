pub mod depth;
pub mod image;

pub use depth::DepthMap;
pub use image::{Image, RGB};
