use super::DepthMap;
use anyhow::{ensure, Result};
use ndarray::{Array2, Zip};

pub trait ResizeDepth {
    /// Bilinear resampling to `size` (width, height), pixel centers aligned.
    fn resize_into(&self, size: (u32, u32)) -> Result<Self>
    where
        Self: Sized;
}

impl ResizeDepth for DepthMap {
    fn resize_into(&self, size: (u32, u32)) -> Result<Self> {
        let (target_width, target_height) = size;
        ensure!(!self.is_empty(), "Cannot resample an empty depth map");
        ensure!(
            target_width > 0 && target_height > 0,
            "Cannot resample a depth map to {}x{}",
            target_width,
            target_height
        );

        if self.get_size() == size {
            return Ok(self.clone());
        }

        let source_width = self.width() as usize;
        let source_height = self.height() as usize;
        let scale_x = source_width as f32 / target_width as f32;
        let scale_y = source_height as f32 / target_height as f32;

        let sample_axis = |target: usize, scale: f32, len: usize| -> (usize, usize, f32) {
            let position = ((target as f32 + 0.5) * scale - 0.5).clamp(0.0, (len - 1) as f32);
            let low = position.floor() as usize;
            let high = (low + 1).min(len - 1);
            (low, high, position - low as f32)
        };

        let mut resized = Array2::<f32>::zeros((target_height as usize, target_width as usize));
        Zip::indexed(&mut resized).par_for_each(|(y, x), value| {
            let (y0, y1, fy) = sample_axis(y, scale_y, source_height);
            let (x0, x1, fx) = sample_axis(x, scale_x, source_width);

            let top = self[[y0, x0]] * (1.0 - fx) + self[[y0, x1]] * fx;
            let bottom = self[[y1, x0]] * (1.0 - fx) + self[[y1, x1]] * fx;
            *value = top * (1.0 - fy) + bottom * fy;
        });

        Ok(DepthMap::new(resized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsampling_keeps_linear_ramps_linear() {
        let depth = DepthMap::from_fn(4, 2, |x, _| x as f32);
        let resized = depth.resize_into((8, 4)).unwrap();

        assert_eq!(resized.get_size(), (8, 4));
        // Interior samples stay on the ramp, edges clamp.
        assert!((resized[[1, 3]] - 1.25).abs() < 1e-5);
        assert_eq!(resized[[0, 0]], 0.0);
        assert_eq!(resized[[3, 7]], 3.0);
    }

    #[test]
    fn same_size_is_identity() {
        let depth = DepthMap::from_fn(5, 3, |x, y| (x * y) as f32);
        assert_eq!(depth.resize_into((5, 3)).unwrap(), depth);
        assert!(depth.resize_into((0, 3)).is_err());
    }
}
