use crate::Image;
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

impl Image {
    /// Decodes any format the `image` crate understands and converts it to RGB24.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode image {}", path.display()))?;
        debug!(
            "Decoded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );

        Ok(Image::from_rgb_image(decoded.to_rgb8()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).context("Failed to decode image bytes")?;
        Ok(Image::from_rgb_image(decoded.to_rgb8()))
    }
}
