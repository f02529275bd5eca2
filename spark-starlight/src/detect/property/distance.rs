use crate::detect::diagnostics::SkipReason;
use crate::detect::{round_to, DISTANCE_DECIMALS};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use spark_inference::BoundingBox;
use spark_media::DepthMap;

/// Smallest box height used as a divisor.
pub const MIN_PIXEL_HEIGHT: f32 = 1.0;
pub const DEFAULT_FOCAL_LENGTH_PX: f32 = 700.0;
pub const DEFAULT_OBJECT_HEIGHT_M: f32 = 1.0;
/// Focal length times the default object height.
pub const DEFAULT_EMPIRICAL_CONSTANT: f32 = 700.0;

/// Typical real-world heights in meters, keyed by lower-case label.
const REFERENCE_HEIGHTS_M: &[(&str, f32)] = &[
    ("person", 1.60),
    ("persona", 1.60),
    ("car", 1.40),
    ("auto", 1.40),
    ("chair", 0.90),
    ("silla", 0.90),
    ("table", 0.75),
    ("mesa", 0.75),
    ("pothole", 1.60),
    ("bache", 1.60),
    ("bench", 1.60),
    ("banqueta", 1.60),
    ("car mirror", 0.90),
    ("retrovisor", 0.90),
    ("car door", 0.75),
    ("puerta auto", 0.75),
];

fn default_heights() -> HashMap<String, f32> {
    REFERENCE_HEIGHTS_M
        .iter()
        .map(|(label, height)| (label.to_string(), *height))
        .collect()
}

fn default_focal_length() -> f32 {
    DEFAULT_FOCAL_LENGTH_PX
}

fn default_object_height() -> f32 {
    DEFAULT_OBJECT_HEIGHT_M
}

/// How a detection's distance from the camera is estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DistanceStrategy {
    /// Pinhole model: `focal * real_height / pixel_height`.
    ReferenceHeight {
        #[serde(default = "default_focal_length")]
        focal_length_px: f32,
        /// Used for labels missing from `heights_m`.
        #[serde(default = "default_object_height")]
        default_height_m: f32,
        #[serde(default = "default_heights")]
        heights_m: HashMap<String, f32>,
    },
    /// One constant for every class: `constant / pixel_height`.
    EmpiricalConstant { constant: f32 },
    /// Median of the normalized depth under the box, times a scale.
    DepthScaled { meters_per_unit: f32 },
}

impl Default for DistanceStrategy {
    fn default() -> Self {
        DistanceStrategy::ReferenceHeight {
            focal_length_px: DEFAULT_FOCAL_LENGTH_PX,
            default_height_m: DEFAULT_OBJECT_HEIGHT_M,
            heights_m: default_heights(),
        }
    }
}

impl DistanceStrategy {
    /// Estimates the distance to an object in meters, rounded to centimeters.
    ///
    /// Args:
    ///     label: class name, matched case-insensitively.
    ///     bbox: clipped box in frame pixels.
    ///     depth: normalized depth at frame resolution, only read by `DepthScaled`.
    pub fn estimate(
        &self,
        label: &str,
        bbox: &BoundingBox<f32>,
        depth: Option<&DepthMap>,
    ) -> Result<f32, SkipReason> {
        let pixel_height = bbox.height().max(MIN_PIXEL_HEIGHT);

        let distance = match self {
            DistanceStrategy::ReferenceHeight {
                focal_length_px,
                default_height_m,
                heights_m,
            } => {
                let real_height = heights_m
                    .get(label.to_lowercase().as_str())
                    .copied()
                    .unwrap_or(*default_height_m);
                focal_length_px * real_height / pixel_height
            }
            DistanceStrategy::EmpiricalConstant { constant } => constant / pixel_height,
            DistanceStrategy::DepthScaled { meters_per_unit } => {
                let depth = depth.ok_or_else(|| {
                    SkipReason::DepthUnavailable("no usable depth for this frame".to_string())
                })?;
                let x1 = bbox.x1.floor() as u32;
                let y1 = bbox.y1.floor() as u32;
                let x2 = (bbox.x2.ceil() as u32).max(x1 + 1);
                let y2 = (bbox.y2.ceil() as u32).max(y1 + 1);
                depth
                    .median_in(x1, y1, x2, y2)
                    .ok_or(SkipReason::NoDepthSamples)?
                    * meters_per_unit
            }
        };

        Ok(round_to(distance, DISTANCE_DECIMALS))
    }

    /// Checks the parameters are usable, returns a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(format!("{} must be a positive number, got {}", name, value))
            }
        };

        match self {
            DistanceStrategy::ReferenceHeight {
                focal_length_px,
                default_height_m,
                heights_m,
            } => {
                positive("focal_length_px", *focal_length_px)?;
                positive("default_height_m", *default_height_m)?;
                for (label, height) in heights_m {
                    positive(label.as_str(), *height)?;
                }
                Ok(())
            }
            DistanceStrategy::EmpiricalConstant { constant } => positive("constant", *constant),
            DistanceStrategy::DepthScaled { meters_per_unit } => {
                positive("meters_per_unit", *meters_per_unit)
            }
        }
    }
}
