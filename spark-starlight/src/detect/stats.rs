use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;

/// Summed-area tables of a field and of its square.
///
/// Window sums come out in constant time regardless of the window size.
pub struct IntegralImage {
    sum: Array2<f64>,
    squared: Array2<f64>,
}

impl IntegralImage {
    pub fn new(field: ArrayView2<'_, f32>) -> Self {
        let (height, width) = field.dim();
        let mut sum = Array2::<f64>::zeros((height + 1, width + 1));
        let mut squared = Array2::<f64>::zeros((height + 1, width + 1));

        for y in 0..height {
            let mut row_sum = 0.0;
            let mut row_squared = 0.0;
            for x in 0..width {
                let value = field[[y, x]] as f64;
                row_sum += value;
                row_squared += value * value;
                sum[[y + 1, x + 1]] = sum[[y, x + 1]] + row_sum;
                squared[[y + 1, x + 1]] = squared[[y, x + 1]] + row_squared;
            }
        }

        IntegralImage { sum, squared }
    }

    fn rect(table: &Array2<f64>, x1: usize, y1: usize, x2: usize, y2: usize) -> f64 {
        table[[y2, x2]] - table[[y1, x2]] - table[[y2, x1]] + table[[y1, x1]]
    }

    /// Mean and variance of the square window of `radius` around `(x, y)`.
    ///
    /// The window is cropped to the field, statistics use only the samples
    /// that fall inside it.
    pub fn window_moments(&self, x: usize, y: usize, radius: usize) -> (f64, f64) {
        let (rows, cols) = self.sum.dim();
        let x1 = x.saturating_sub(radius);
        let y1 = y.saturating_sub(radius);
        let x2 = (x + radius + 1).min(cols - 1);
        let y2 = (y + radius + 1).min(rows - 1);

        let count = ((x2 - x1) * (y2 - y1)) as f64;
        if count == 0.0 {
            return (0.0, 0.0);
        }

        let mean = Self::rect(&self.sum, x1, y1, x2, y2) / count;
        let mean_squared = Self::rect(&self.squared, x1, y1, x2, y2) / count;
        (mean, (mean_squared - mean * mean).max(0.0))
    }
}

/// Sum over the given fields of the local variance in a `window` x `window` box.
pub fn summed_local_variance(fields: &[ArrayView2<'_, f32>], window: usize) -> Array2<f32> {
    let Some(first) = fields.first() else {
        return Array2::zeros((0, 0));
    };
    let radius = window / 2;
    let tables = fields
        .par_iter()
        .map(|field| IntegralImage::new(field.view()))
        .collect::<Vec<_>>();

    let mut variance = Array2::<f32>::zeros(first.dim());
    Zip::indexed(&mut variance).par_for_each(|(y, x), value| {
        *value = tables
            .iter()
            .map(|table| table.window_moments(x, y, radius).1)
            .sum::<f64>() as f32;
    });
    variance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_field_has_no_variance() {
        let field = Array2::<f32>::from_elem((20, 30), 0.7);
        let table = IntegralImage::new(field.view());

        let (mean, variance) = table.window_moments(15, 10, 5);
        assert!((mean - 0.7).abs() < 1e-6);
        assert!(variance < 1e-9);
    }

    #[test]
    fn border_windows_only_count_pixels_inside() {
        // Left half 0, right half 1.
        let field = Array2::from_shape_fn((10, 10), |(_, x)| if x < 5 { 0.0f32 } else { 1.0 });
        let table = IntegralImage::new(field.view());

        // Corner window covers columns 0..=2, all zero.
        assert_eq!(table.window_moments(0, 0, 2), (0.0, 0.0));

        // Window at x = 4 covers columns 2..=6: two ones out of five.
        let (mean, variance) = table.window_moments(4, 4, 2);
        assert!((mean - 0.4).abs() < 1e-9);
        assert!((variance - 0.24).abs() < 1e-9);
    }

    #[test]
    fn variances_of_each_field_add_up() {
        let ones = Array2::from_shape_fn((9, 9), |(_, x)| (x % 2) as f32);
        let variance = summed_local_variance(&[ones.view(), ones.view()], 3);

        // Alternating columns inside a 3x3 box: mean 1/3 or 2/3, variance 2/9 per field.
        assert!((variance[[4, 4]] - 4.0 / 9.0).abs() < 1e-5);
    }
}
