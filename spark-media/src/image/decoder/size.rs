use crate::Image;

impl Image {
    pub fn get_width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn get_height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn get_size(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// Number of pixels, not bytes.
    pub fn pixel_count(&self) -> usize {
        self.buffer.width() as usize * self.buffer.height() as usize
    }
}
