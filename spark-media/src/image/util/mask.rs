use crate::{Image, RGB};
use anyhow::{ensure, Result};
use bitvec::prelude::*;
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use rayon::prelude::*;

pub trait ApplyMask {
    /// Blends `apply_color` into every pixel set in `mask` at opacity `alpha`.
    ///
    /// The mask is row-major and must cover the whole frame.
    fn layering_mask(&mut self, mask: &BitVec, apply_color: RGB, alpha: f32) -> Result<()>;
}

impl ApplyMask for Image {
    fn layering_mask(&mut self, mask: &BitVec, apply_color: RGB, alpha: f32) -> Result<()> {
        ensure!(
            mask.len() == self.pixel_count(),
            "Mask length {} does not match frame {}x{}",
            mask.len(),
            self.get_width(),
            self.get_height()
        );

        let alpha = alpha.clamp(0.0, 1.0);
        let color: [u8; 3] = apply_color.into();

        self.buffer
            .par_chunks_exact_mut(3)
            .enumerate()
            .filter(|(index, _)| mask[*index])
            .for_each(|(_, pixel)| {
                for (channel, tint) in pixel.iter_mut().zip(color) {
                    let blended = (1.0 - alpha) * *channel as f32 + alpha * tint as f32;
                    *channel = blended.round().clamp(0.0, 255.0) as u8;
                }
            });

        Ok(())
    }
}

/// Nearest-neighbour resampling of a row-major mask.
pub fn resize_mask(
    mask: &BitVec,
    source_size: (u32, u32),
    target_size: (u32, u32),
) -> Result<BitVec> {
    let (source_width, source_height) = source_size;
    let (target_width, target_height) = target_size;
    ensure!(
        mask.len() == source_width as usize * source_height as usize,
        "Mask length {} does not match {}x{}",
        mask.len(),
        source_width,
        source_height
    );

    if source_size == target_size {
        return Ok(mask.clone());
    }

    let mut resized = bitvec![0; target_width as usize * target_height as usize];
    if source_width == 0 || source_height == 0 {
        return Ok(resized);
    }

    let scale_x = source_width as f32 / target_width.max(1) as f32;
    let scale_y = source_height as f32 / target_height.max(1) as f32;

    for y in 0..target_height {
        let source_y = (((y as f32 + 0.5) * scale_y) as u32).min(source_height - 1);
        for x in 0..target_width {
            let source_x = (((x as f32 + 0.5) * scale_x) as u32).min(source_width - 1);
            let source_index = (source_y * source_width + source_x) as usize;
            if mask[source_index] {
                resized.set((y * target_width + x) as usize, true);
            }
        }
    }

    Ok(resized)
}

/// Fills the polygon described by `points` (pixel coordinates) into a frame-sized mask.
pub fn rasterize_polygon(points: &[(i32, i32)], width: u32, height: u32) -> BitVec {
    let mut canvas = GrayImage::new(width, height);

    match points {
        [] => {}
        [single] => {
            if let (Ok(x), Ok(y)) = (u32::try_from(single.0), u32::try_from(single.1)) {
                if x < width && y < height {
                    canvas.put_pixel(x, y, Luma([255]));
                }
            }
        }
        _ => {
            let mut polygon = points
                .iter()
                .map(|&(x, y)| Point::new(x, y))
                .collect::<Vec<_>>();
            // The polygon filler rejects explicitly closed rings.
            while polygon.len() > 1 && polygon.first() == polygon.last() {
                polygon.pop();
            }
            draw_polygon_mut(&mut canvas, &polygon, Luma([255]));
        }
    }

    canvas.pixels().map(|pixel| pixel.0[0] > 0).collect()
}
