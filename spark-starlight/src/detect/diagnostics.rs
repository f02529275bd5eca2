use serde::Serialize;
use std::fmt::{Display, Formatter};

/// What a skipped item was.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemSource {
    /// Item `index` of the list returned by detector `detector`.
    Detection { detector: usize, index: usize },
    /// The instance mask attached to a detection.
    DetectionMask { detector: usize, index: usize },
    /// A whole detector that produced no list for this frame.
    Detector { detector: usize },
    /// Wall segmentation as a whole.
    Segmentation,
    /// Connected component `index` of the cleaned wall mask.
    Region { index: usize },
}

/// Why an item was left out of the frame result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    NonFiniteBox,
    InvertedBox,
    OutsideFrame,
    InvalidConfidence(f32),
    NoDepthSamples,
    DepthUnavailable(String),
    MaskMismatch(String),
    ContourNotClosed,
    DetectorFailed(String),
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NonFiniteBox => write!(f, "bounding box has non-finite corners"),
            SkipReason::InvertedBox => write!(f, "bounding box corners are inverted"),
            SkipReason::OutsideFrame => write!(f, "bounding box lies outside the frame"),
            SkipReason::InvalidConfidence(score) => write!(f, "confidence {} is not in [0, 1]", score),
            SkipReason::NoDepthSamples => write!(f, "no depth samples under the bounding box"),
            SkipReason::DepthUnavailable(why) => write!(f, "depth map unusable: {}", why),
            SkipReason::MaskMismatch(why) => write!(f, "instance mask dropped: {}", why),
            SkipReason::ContourNotClosed => write!(f, "region contour did not close"),
            SkipReason::DetectorFailed(why) => write!(f, "detector failed: {}", why),
        }
    }
}

impl Display for ItemSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemSource::Detection { detector, index } => write!(f, "detection {}/{}", detector, index),
            ItemSource::DetectionMask { detector, index } => write!(f, "mask of detection {}/{}", detector, index),
            ItemSource::Detector { detector } => write!(f, "detector {}", detector),
            ItemSource::Segmentation => write!(f, "wall segmentation"),
            ItemSource::Region { index } => write!(f, "region {}", index),
        }
    }
}

/// One per-item skip, kept on the frame result instead of being swallowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub source: ItemSource,
    #[serde(flatten)]
    pub reason: SkipReason,
}

impl Diagnostic {
    pub fn new(source: ItemSource, reason: SkipReason) -> Self {
        Diagnostic { source, reason }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} skipped: {}", self.source, self.reason)
    }
}
