use anyhow::{anyhow, Result};
use image::{Rgb, RgbImage};

/// Solid color in RGB channel order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RGB(pub u8, pub u8, pub u8);

impl From<RGB> for Rgb<u8> {
    fn from(value: RGB) -> Self {
        Rgb([value.0, value.1, value.2])
    }
}

impl From<RGB> for [u8; 3] {
    fn from(value: RGB) -> Self {
        [value.0, value.1, value.2]
    }
}

/// 8-bit, 3-channel frame buffer in row-major RGB24 layout.
///
/// The frame a request owns is never written to; rendering happens on a
/// [`Image::working_copy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub(crate) buffer: RgbImage,
}

impl Image {
    /// Black frame of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Image {
            buffer: RgbImage::new(width, height),
        }
    }

    /// Frame of the given size filled with one color.
    pub fn filled(width: u32, height: u32, color: RGB) -> Self {
        Image {
            buffer: RgbImage::from_pixel(width, height, color.into()),
        }
    }

    /// Wraps raw RGB24 bytes. Fails when the length does not match `width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        let actual = data.len();
        let buffer = RgbImage::from_raw(width, height, data).ok_or_else(|| {
            anyhow!(
                "raw frame length mismatch: {} bytes for {}x{} (expected {})",
                actual,
                width,
                height,
                expected
            )
        })?;

        Ok(Image { buffer })
    }

    pub fn from_rgb_image(buffer: RgbImage) -> Self {
        Image { buffer }
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.width() == 0 || self.buffer.height() == 0
    }

    pub fn raw_data(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn buffer(&self) -> &RgbImage {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut RgbImage {
        &mut self.buffer
    }

    pub fn into_inner(self) -> RgbImage {
        self.buffer
    }

    /// Copy used as the rendering target of one request.
    pub fn working_copy(&self) -> Image {
        self.clone()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<RGB> {
        if x >= self.buffer.width() || y >= self.buffer.height() {
            return None;
        }
        let Rgb([r, g, b]) = *self.buffer.get_pixel(x, y);
        Some(RGB(r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_short_buffers() {
        assert!(Image::from_raw(4, 4, vec![0; 47]).is_err());
        let image = Image::from_raw(4, 4, vec![7; 48]).unwrap();
        assert_eq!(image.pixel(3, 3), Some(RGB(7, 7, 7)));
        assert_eq!(image.pixel(4, 0), None);
    }

    #[test]
    fn working_copy_is_detached() {
        let source = Image::filled(2, 2, RGB(10, 20, 30));
        let mut copy = source.working_copy();
        copy.buffer_mut().put_pixel(0, 0, RGB(0, 0, 0).into());

        assert_eq!(source.pixel(0, 0), Some(RGB(10, 20, 30)));
        assert_eq!(copy.pixel(0, 0), Some(RGB(0, 0, 0)));
    }
}
