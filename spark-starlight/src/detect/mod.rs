pub mod analysis;
pub mod contour;
pub mod diagnostics;
pub mod fusion;
pub mod morphology;
pub mod normal;
pub mod property;
pub mod stats;
pub mod wall;

/// Normalized X below which a detection is "left".
pub(crate) const DIRECTION_LEFT_BOUNDARY: f64 = 0.33;
/// Normalized X above which a detection is "right".
pub(crate) const DIRECTION_RIGHT_BOUNDARY: f64 = 0.66;

/// Decimal places kept on distances and confidences in results.
pub(crate) const DISTANCE_DECIMALS: i32 = 2;
pub(crate) const CONFIDENCE_DECIMALS: i32 = 3;

/// Guard added to the gradient norm so a flat patch keeps a defined normal.
pub(crate) const NORMAL_EPSILON: f32 = 1e-6;
/// Sum of the absolute weights on one side of the 3x3 Sobel kernel.
pub(crate) const SOBEL_WEIGHT: f32 = 8.0;

pub(crate) const WALL_LABEL: &str = "wall";

pub(crate) fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}
