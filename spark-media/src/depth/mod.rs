mod resample;

pub use resample::ResizeDepth;

use anyhow::{ensure, Context, Result};
use image::{ImageBuffer, Luma};
use ndarray::Array2;
use std::ops::Deref;
use std::path::Path;

/// Guard added to the value range before normalizing.
pub const DEPTH_RANGE_EPSILON: f32 = 1e-6;

/// Dense relative depth, indexed `[[y, x]]`.
///
/// Larger values are farther from the camera. The scale is whatever the
/// depth provider produced until [`DepthMap::normalized`] maps it to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthMap(Array2<f32>);

impl Deref for DepthMap {
    type Target = Array2<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Array2<f32>> for DepthMap {
    fn from(value: Array2<f32>) -> Self {
        DepthMap(value)
    }
}

impl DepthMap {
    pub fn new(data: Array2<f32>) -> Self {
        DepthMap(data)
    }

    /// Builds a map from row-major samples.
    pub fn from_vec(width: u32, height: u32, data: Vec<f32>) -> Result<Self> {
        let samples = data.len();
        let array = Array2::from_shape_vec((height as usize, width as usize), data).with_context(
            || format!("{} depth samples cannot form a {}x{} map", samples, width, height),
        )?;

        Ok(DepthMap(array))
    }

    /// Builds a map by evaluating `f(x, y)` at every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(usize, usize) -> f32) -> Self {
        DepthMap(Array2::from_shape_fn(
            (height as usize, width as usize),
            |(y, x)| f(x, y),
        ))
    }

    /// Reads a 16-bit (or 8-bit) grayscale image where white is farthest.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("Failed to decode depth image {}", path.display()))?;

        Ok(Self::from_luma16(&decoded.to_luma16()))
    }

    pub fn from_luma16(image: &ImageBuffer<Luma<u16>, Vec<u16>>) -> Self {
        let (width, height) = image.dimensions();
        Self::from_fn(width, height, |x, y| {
            image.get_pixel(x as u32, y as u32).0[0] as f32 / u16::MAX as f32
        })
    }

    pub fn width(&self) -> u32 {
        self.0.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.0.nrows() as u32
    }

    pub fn get_size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f32> {
        self.0.get((y as usize, x as usize)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|value| value.is_finite())
    }

    /// Smallest and largest sample, `None` for an empty map.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.0.iter().fold(None, |range, &value| match range {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
    }

    /// Maps the samples to `[0, 1]` with `(d - min) / (max - min + eps)`.
    ///
    /// A constant map becomes all zeros instead of dividing by zero.
    pub fn normalized(&self) -> Result<DepthMap> {
        ensure!(!self.is_empty(), "Cannot normalize an empty depth map");
        ensure!(self.is_finite(), "Depth map contains non-finite samples");

        let (min, max) = self.value_range().context("Depth map has no samples")?;
        let scale = 1.0 / (max - min + DEPTH_RANGE_EPSILON);

        Ok(DepthMap(self.0.mapv(|value| (value - min) * scale)))
    }

    /// Median of the samples inside `[x1, x2) x [y1, y2)`, clipped to the map.
    pub fn median_in(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> Option<f32> {
        let x2 = x2.min(self.width());
        let y2 = y2.min(self.height());
        if x1 >= x2 || y1 >= y2 {
            return None;
        }

        let mut samples = self
            .0
            .slice(ndarray::s![y1 as usize..y2 as usize, x1 as usize..x2 as usize])
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .collect::<Vec<_>>();
        if samples.is_empty() {
            return None;
        }

        let middle = samples.len() / 2;
        let (_, median, _) = samples.select_nth_unstable_by(middle, f32::total_cmp);
        Some(*median)
    }

    pub fn into_inner(self) -> Array2<f32> {
        self.0
    }
}
