use crate::config::StarlightConfig;
use crate::detect::diagnostics::{Diagnostic, ItemSource, SkipReason};
use crate::detect::fusion::{DetectionBox, DetectionFusion};
use crate::detect::property::direction::DirectionCategory;
use crate::detect::wall::{PlanarRegionSegmenter, WallRegion};
use crate::detect::{round_to, CONFIDENCE_DECIMALS};
use crate::error::FrameError;
use crate::overlay::{ClassColorTable, OverlayCompositor};
use log::{debug, warn};
use serde::Serialize;
use spark_inference::DetectResult;
use spark_media::depth::ResizeDepth;
use spark_media::{DepthMap, Image};
use std::sync::Arc;

/// Everything produced for one frame.
#[derive(Debug, Clone)]
pub struct FrameResult {
    /// Nearest first.
    pub detections: Vec<DetectionBox>,
    pub walls: Vec<WallRegion>,
    pub alert: bool,
    pub overlay: Image,
    pub diagnostics: Vec<Diagnostic>,
}

/// Serializable view of a [`FrameResult`] without the overlay pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub ok: bool,
    pub objects: Vec<ObjectReport>,
    pub walls: Vec<WallReport>,
    pub alert: bool,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectReport {
    pub cls: u32,
    pub label: String,
    pub conf: f32,
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub w: i32,
    pub h: i32,
    pub direction: DirectionCategory,
    pub distance_m: f32,
    pub alert: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WallReport {
    pub label: String,
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
    pub area: f32,
}

impl From<&DetectionBox> for ObjectReport {
    fn from(detection: &DetectionBox) -> Self {
        let bbox = &detection.bbox;
        let (x1, y1) = (bbox.x1.round() as i32, bbox.y1.round() as i32);
        let (x2, y2) = (bbox.x2.round() as i32, bbox.y2.round() as i32);
        ObjectReport {
            cls: detection.class_id,
            label: detection.label.clone(),
            conf: round_to(detection.confidence, CONFIDENCE_DECIMALS),
            x1,
            y1,
            x2,
            y2,
            w: x2 - x1,
            h: y2 - y1,
            direction: detection.direction,
            distance_m: detection.distance_m,
            alert: detection.alert,
        }
    }
}

impl From<&WallRegion> for WallReport {
    fn from(wall: &WallRegion) -> Self {
        WallReport {
            label: wall.label.to_string(),
            x1: wall.bbox.x1,
            y1: wall.bbox.y1,
            x2: wall.bbox.x2,
            y2: wall.bbox.y2,
            area: wall.area.round(),
        }
    }
}

impl FrameResult {
    pub fn report(&self) -> FrameReport {
        FrameReport {
            ok: true,
            objects: self.detections.iter().map(ObjectReport::from).collect(),
            walls: self.walls.iter().map(WallReport::from).collect(),
            alert: self.alert,
            diagnostics: self.diagnostics.clone(),
        }
    }

    pub fn encode_overlay(&self, quality: u8) -> Result<Vec<u8>, FrameError> {
        self.overlay
            .encode_jpeg(quality)
            .map_err(|err| FrameError::Encode(format!("{:#}", err)))
    }
}

/// Processes one frame: walls from depth, fused detections, overlay.
///
/// Args:
///     image: the frame, never modified.
///     depth: the frame's depth map at any resolution. `None` fails the frame;
///         a map that is empty or has non-finite samples only disables walls
///         and depth-based distances.
///     detection_lists: one list per detector, in detector order.
pub fn process_frame(
    image: &Image,
    depth: Option<&DepthMap>,
    detection_lists: &[Vec<DetectResult>],
    config: &StarlightConfig,
    palette: &ClassColorTable,
) -> Result<FrameResult, FrameError> {
    let (width, height) = image.get_size();
    if image.is_empty() {
        return Err(FrameError::EmptyFrame { width, height });
    }
    let depth = depth.ok_or(FrameError::MissingDepth)?;

    let mut diagnostics = Vec::new();
    let normalized = match prepare_depth(depth, (width, height)) {
        Ok(normalized) => Some(normalized),
        Err(reason) => {
            warn!("Skipping wall segmentation: {}", reason);
            diagnostics.push(Diagnostic::new(ItemSource::Segmentation, reason));
            None
        }
    };

    let walls = match &normalized {
        Some(depth) => {
            let outcome = PlanarRegionSegmenter::new(&config.segmentation).segment_depth(depth);
            diagnostics.extend(outcome.skipped);
            outcome.regions
        }
        None => Vec::new(),
    };

    let fusion = DetectionFusion::new(&config.detection, (width, height), normalized.as_ref())
        .fuse(detection_lists);
    diagnostics.extend(fusion.skipped);

    let overlay = OverlayCompositor::new(&config.overlay, palette).compose(
        image,
        &fusion.detections,
        &walls,
        fusion.alert,
    );

    debug!(
        "Frame {}x{}: {} detections, {} walls, alert {}, {} skipped",
        width,
        height,
        fusion.detections.len(),
        walls.len(),
        fusion.alert,
        diagnostics.len()
    );

    Ok(FrameResult {
        detections: fusion.detections,
        walls,
        alert: fusion.alert,
        overlay,
        diagnostics,
    })
}

/// Resamples to the frame size and normalizes to `[0, 1]`.
fn prepare_depth(depth: &DepthMap, frame_size: (u32, u32)) -> Result<DepthMap, SkipReason> {
    if depth.is_empty() {
        return Err(SkipReason::DepthUnavailable("depth map is empty".to_string()));
    }
    if !depth.is_finite() {
        return Err(SkipReason::DepthUnavailable(
            "depth map has non-finite samples".to_string(),
        ));
    }

    depth
        .resize_into(frame_size)
        .and_then(|resized| resized.normalized())
        .map_err(|err| SkipReason::DepthUnavailable(err.to_string()))
}

/// Owns the configuration and color table shared by every frame.
pub struct FrameProcessingPipeline {
    config: StarlightConfig,
    palette: Arc<ClassColorTable>,
}

impl FrameProcessingPipeline {
    pub fn new(config: StarlightConfig) -> Self {
        Self::with_palette(config, Arc::new(ClassColorTable::new()))
    }

    pub fn with_palette(config: StarlightConfig, palette: Arc<ClassColorTable>) -> Self {
        FrameProcessingPipeline { config, palette }
    }

    pub fn config(&self) -> &StarlightConfig {
        &self.config
    }

    pub fn palette(&self) -> &Arc<ClassColorTable> {
        &self.palette
    }

    pub fn process_frame(
        &self,
        image: &Image,
        depth: Option<&DepthMap>,
        detection_lists: &[Vec<DetectResult>],
    ) -> Result<FrameResult, FrameError> {
        process_frame(image, depth, detection_lists, &self.config, &self.palette)
    }
}
