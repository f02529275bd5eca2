use crate::Image;
use anyhow::{ensure, Context, Result};
use image::codecs::jpeg::JpegEncoder;
use std::path::Path;

impl Image {
    /// Encodes the frame as baseline JPEG. `quality` is clamped to 1..=100.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        ensure!(!self.is_empty(), "Cannot encode an empty image");

        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
            .encode_image(&self.buffer)
            .context("Failed to encode JPEG")?;

        Ok(bytes)
    }

    /// Saves with the format implied by the file extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.buffer
            .save(path)
            .with_context(|| format!("Failed to save image {}", path.display()))
    }

    pub fn save_jpeg(&self, path: impl AsRef<Path>, quality: u8) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode_jpeg(quality)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}
