use crate::utils::graph::BoundingBox;
use anyhow::Result;
use bitvec::vec::BitVec;
use spark_media::Image;

/// Binary instance mask at the detector's own resolution, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectMask {
    pub width: u32,
    pub height: u32,
    pub bits: BitVec,
}

/// One raw detector output item, in source-image pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectResult {
    pub class_id: u32,
    pub label: String,
    pub score: f32,
    pub bbox: BoundingBox<f32>,
    pub mask: Option<DetectMask>,
}

impl DetectResult {
    pub fn new(class_id: u32, label: impl Into<String>, score: f32, bbox: BoundingBox<f32>) -> Self {
        DetectResult {
            class_id,
            label: label.into(),
            score,
            bbox,
            mask: None,
        }
    }

    pub fn with_mask(mut self, mask: DetectMask) -> Self {
        self.mask = Some(mask);
        self
    }
}

/// Object detector returning boxes above `confidence`.
///
/// Implementations may ignore `confidence` and return everything; the
/// consumer applies its own threshold again.
pub trait DetectInference: Send + Sync {
    fn name(&self) -> &str;

    fn inference_detect(&self, image: &Image, confidence: f32) -> Result<Vec<DetectResult>>;
}
