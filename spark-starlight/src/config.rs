use crate::detect::property::distance::DistanceStrategy;
use anyhow::{ensure, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_ENV: &str = "STARLIGHT_CONFIG";

/// Everything the pipeline reads at runtime, every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarlightConfig {
    pub detection: DetectionConfig,
    pub segmentation: SegmentationConfig,
    pub overlay: OverlayConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Detections scoring below this are dropped before fusion.
    pub confidence_threshold: f32,
    /// Objects closer than this many meters raise the proximity alert.
    pub proximity_alert_m: f32,
    pub distance: DistanceStrategy,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            confidence_threshold: 0.4,
            proximity_alert_m: 1.5,
            distance: DistanceStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// Minimum `|nx|` for a pixel to count as facing sideways.
    pub horizontal_normal_threshold: f32,
    /// Maximum summed local variance of the normal components.
    pub planarity_threshold: f32,
    /// Side of the square window the variance is taken over, odd.
    pub planarity_window: usize,
    /// Side of the elliptical structuring element.
    pub kernel_size: u32,
    pub closing_iterations: u32,
    pub opening_iterations: u32,
    /// Regions enclosing less than this many square pixels are dropped.
    pub min_region_area: f32,
    /// Frame widths spanned by one unit of normalized depth.
    pub depth_gain: f32,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        SegmentationConfig {
            horizontal_normal_threshold: 0.45,
            planarity_threshold: 0.03,
            planarity_window: 11,
            kernel_size: 5,
            closing_iterations: 2,
            opening_iterations: 1,
            min_region_area: 1500.0,
            depth_gain: 1.0,
        }
    }
}

/// Which layer is painted last and therefore ends up on top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerOrder {
    /// Wall tint first, detections drawn over it.
    #[default]
    WallsFirst,
    DetectionsFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Blend weight of tints, `(1 - alpha) * pixel + alpha * color`.
    pub alpha: f32,
    pub order: LayerOrder,
    pub box_thickness: u32,
    pub label_scale: u32,
    pub banner_text: String,
    pub banner_scale: u32,
    pub jpeg_quality: u8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            alpha: 0.4,
            order: LayerOrder::default(),
            box_thickness: 2,
            label_scale: 1,
            banner_text: "OBSTACLE CLOSE".to_string(),
            banner_scale: 3,
            jpeg_quality: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Frames processed at the same time, further requests are rejected.
    pub workers: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig { workers: 2 }
    }
}

impl StarlightConfig {
    /// Reads `path`, or the file named by `STARLIGHT_CONFIG`, or falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var(CONFIG_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let config = match (path, from_env.as_deref()) {
            (Some(path), _) => Self::from_file(path)?,
            (None, Some(env_path)) => Self::from_file(Path::new(env_path))?,
            (None, None) => {
                info!("No configuration file given, using defaults");
                StarlightConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<()> {
        let detection = &self.detection;
        ensure!(
            (0.0..=1.0).contains(&detection.confidence_threshold),
            "detection.confidence_threshold must be within [0, 1]"
        );
        ensure!(
            detection.proximity_alert_m.is_finite() && detection.proximity_alert_m >= 0.0,
            "detection.proximity_alert_m must be a non-negative number"
        );
        detection
            .distance
            .validate()
            .map_err(|message| anyhow::anyhow!("detection.distance: {}", message))?;

        let segmentation = &self.segmentation;
        ensure!(
            (0.0..=1.0).contains(&segmentation.horizontal_normal_threshold),
            "segmentation.horizontal_normal_threshold must be within [0, 1]"
        );
        ensure!(
            segmentation.planarity_threshold > 0.0,
            "segmentation.planarity_threshold must be positive"
        );
        ensure!(
            segmentation.planarity_window >= 3 && segmentation.planarity_window % 2 == 1,
            "segmentation.planarity_window must be an odd number of at least 3"
        );
        ensure!(
            segmentation.kernel_size >= 1,
            "segmentation.kernel_size must be at least 1"
        );
        ensure!(
            segmentation.min_region_area >= 0.0,
            "segmentation.min_region_area must not be negative"
        );
        ensure!(
            segmentation.depth_gain.is_finite() && segmentation.depth_gain > 0.0,
            "segmentation.depth_gain must be positive"
        );

        let overlay = &self.overlay;
        ensure!(
            (0.0..=1.0).contains(&overlay.alpha),
            "overlay.alpha must be within [0, 1]"
        );
        ensure!(
            (1..=100).contains(&overlay.jpeg_quality),
            "overlay.jpeg_quality must be within [1, 100]"
        );
        ensure!(
            overlay.label_scale >= 1 && overlay.banner_scale >= 1,
            "overlay text scales must be at least 1"
        );

        ensure!(self.service.workers >= 1, "service.workers must be at least 1");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() -> Result<()> {
        let config = StarlightConfig::default();
        config.validate()?;

        assert_eq!(config.detection.confidence_threshold, 0.4);
        assert_eq!(config.segmentation.planarity_window, 11);
        assert_eq!(config.overlay.order, LayerOrder::WallsFirst);
        assert_eq!(config.service.workers, 2);
        Ok(())
    }

    #[test]
    fn partial_files_keep_the_other_defaults() -> Result<()> {
        let config = StarlightConfig::from_toml(
            r#"
            [segmentation]
            depth_gain = 0.75

            [overlay]
            order = "detections_first"

            [detection.distance]
            mode = "empirical_constant"
            constant = 650.0
            "#,
        )?;

        assert_eq!(config.segmentation.depth_gain, 0.75);
        assert_eq!(config.segmentation.min_region_area, 1500.0);
        assert_eq!(config.overlay.order, LayerOrder::DetectionsFirst);
        assert_eq!(
            config.detection.distance,
            DistanceStrategy::EmpiricalConstant { constant: 650.0 }
        );
        assert_eq!(config.detection.proximity_alert_m, 1.5);
        Ok(())
    }

    #[test]
    fn invalid_values_are_rejected() -> Result<()> {
        let mut config = StarlightConfig::default();
        config.segmentation.planarity_window = 10;
        assert!(config.validate().is_err());

        let mut config = StarlightConfig::default();
        config.service.workers = 0;
        assert!(config.validate().is_err());

        assert!(StarlightConfig::from_toml("[overlay]\nalpha = \"high\"").is_err());
        Ok(())
    }

    #[test]
    fn explicit_path_is_read() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(file, "[service]\nworkers = 4")?;

        let config = StarlightConfig::load(Some(file.path()))?;
        assert_eq!(config.service.workers, 4);
        Ok(())
    }
}
