use super::glyph::{glyph, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::{Image, RGB};
use image::Rgb;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

/// Pixel size of `text` rendered at `scale`.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let scale = scale.max(1);
    let count = text.chars().count() as u32;
    if count == 0 {
        return (0, 0);
    }

    (
        (count * GLYPH_ADVANCE - (GLYPH_ADVANCE - GLYPH_WIDTH)) * scale,
        GLYPH_HEIGHT * scale,
    )
}

pub trait DrawOverlay {
    /// Outlines the box spanned by the two corners, `thickness` pixels inward.
    fn draw_box(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: RGB, thickness: u32);

    /// Renders `text` with its top-left corner at `origin`. Pixels outside the frame are dropped.
    fn draw_text(&mut self, origin: (i32, i32), text: &str, color: RGB, scale: u32);
}

impl DrawOverlay for Image {
    fn draw_box(&mut self, top_left: (i32, i32), bottom_right: (i32, i32), color: RGB, thickness: u32) {
        let color: Rgb<u8> = color.into();
        let (x1, y1) = (top_left.0.min(bottom_right.0), top_left.1.min(bottom_right.1));
        let (x2, y2) = (top_left.0.max(bottom_right.0), top_left.1.max(bottom_right.1));

        for inset in 0..thickness.max(1) as i32 {
            let width = x2 - x1 - 2 * inset + 1;
            let height = y2 - y1 - 2 * inset + 1;
            if width <= 0 || height <= 0 {
                break;
            }
            let rect = Rect::at(x1 + inset, y1 + inset).of_size(width as u32, height as u32);
            draw_hollow_rect_mut(&mut self.buffer, rect, color);
        }
    }

    fn draw_text(&mut self, origin: (i32, i32), text: &str, color: RGB, scale: u32) {
        let color: Rgb<u8> = color.into();
        let scale = scale.max(1);

        for (index, c) in text.chars().enumerate() {
            let glyph_x = origin.0 + (index as u32 * GLYPH_ADVANCE * scale) as i32;
            if glyph_x >= self.get_width() as i32 {
                break;
            }

            for (row, bits) in glyph(c).iter().enumerate() {
                for column in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - column)) == 0 {
                        continue;
                    }
                    let x = glyph_x + (column * scale) as i32;
                    let y = origin.1 + (row as u32 * scale) as i32;
                    draw_filled_rect_mut(&mut self.buffer, Rect::at(x, y).of_size(scale, scale), color);
                }
            }
        }
    }
}
