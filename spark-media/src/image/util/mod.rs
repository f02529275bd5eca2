pub mod draw;
mod glyph;
pub mod mask;
