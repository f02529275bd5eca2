#[allow(clippy::module_inception)]
mod image;

pub mod decoder;
pub mod encoder;
pub mod util;

pub use image::{Image, RGB};
