pub mod compositor;
pub mod palette;

pub use compositor::OverlayCompositor;
pub use palette::{ClassColorTable, ClassKey};
