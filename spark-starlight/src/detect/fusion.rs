use crate::config::DetectionConfig;
use crate::detect::diagnostics::{Diagnostic, ItemSource, SkipReason};
use crate::detect::property::direction::DirectionCategory;
use bitvec::prelude::*;
use log::warn;
use spark_inference::{BoundingBox, DetectMask, DetectResult};
use spark_media::image::util::mask::resize_mask;
use spark_media::DepthMap;

/// A detection after clipping, distance estimation and alert tagging.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionBox {
    pub class_id: u32,
    pub label: String,
    pub confidence: f32,
    /// Clipped to the frame.
    pub bbox: BoundingBox<f32>,
    pub direction: DirectionCategory,
    pub distance_m: f32,
    pub alert: bool,
    /// Instance mask at frame resolution, row-major.
    pub mask: Option<BitVec>,
}

#[derive(Debug, Default)]
pub struct FusionOutcome {
    /// Sorted by ascending distance, ties keep their input order.
    pub detections: Vec<DetectionBox>,
    /// True when any kept detection is inside the alert distance.
    pub alert: bool,
    pub skipped: Vec<Diagnostic>,
}

/// Merges the lists of every detector into one list for a frame.
pub struct DetectionFusion<'a> {
    config: &'a DetectionConfig,
    frame_size: (u32, u32),
    depth: Option<&'a DepthMap>,
}

impl<'a> DetectionFusion<'a> {
    /// Args:
    ///     frame_size: (width, height) of the frame the boxes refer to.
    ///     depth: normalized depth at frame resolution, if the frame has a usable one.
    pub fn new(config: &'a DetectionConfig, frame_size: (u32, u32), depth: Option<&'a DepthMap>) -> Self {
        DetectionFusion {
            config,
            frame_size,
            depth,
        }
    }

    pub fn fuse(&self, lists: &[Vec<DetectResult>]) -> FusionOutcome {
        let mut outcome = FusionOutcome::default();

        for (detector, list) in lists.iter().enumerate() {
            for (index, raw) in list.iter().enumerate() {
                if raw.score.is_finite() && raw.score < self.config.confidence_threshold {
                    continue;
                }

                match self.annotate(raw) {
                    Ok(mut detection) => {
                        if let Some(mask) = &raw.mask {
                            match self.frame_mask(mask) {
                                Ok(resized) => detection.mask = Some(resized),
                                Err(reason) => outcome.skipped.push(Diagnostic::new(
                                    ItemSource::DetectionMask { detector, index },
                                    reason,
                                )),
                            }
                        }
                        outcome.detections.push(detection);
                    }
                    Err(reason) => {
                        warn!("Skipping {} from detector {}: {}", raw.label, detector, reason);
                        outcome
                            .skipped
                            .push(Diagnostic::new(ItemSource::Detection { detector, index }, reason));
                    }
                }
            }
        }

        outcome
            .detections
            .sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        outcome.alert = outcome.detections.iter().any(|detection| detection.alert);
        outcome
    }

    /// Validates, clips and measures a single raw detection.
    pub fn annotate(&self, raw: &DetectResult) -> Result<DetectionBox, SkipReason> {
        let (width, height) = self.frame_size;
        let bbox = raw.bbox;

        if !(0.0..=1.0).contains(&raw.score) {
            return Err(SkipReason::InvalidConfidence(raw.score));
        }
        if !bbox.is_finite() {
            return Err(SkipReason::NonFiniteBox);
        }
        if bbox.x2 < bbox.x1 || bbox.y2 < bbox.y1 {
            return Err(SkipReason::InvertedBox);
        }
        if bbox.x2 <= 0.0 || bbox.y2 <= 0.0 || bbox.x1 >= width as f32 || bbox.y1 >= height as f32 {
            return Err(SkipReason::OutsideFrame);
        }

        let bbox = bbox.clip(width as f32, height as f32);
        let direction = DirectionCategory::get_direction(bbox.center().x, width);
        let distance_m = self.config.distance.estimate(&raw.label, &bbox, self.depth)?;

        Ok(DetectionBox {
            class_id: raw.class_id,
            label: raw.label.clone(),
            confidence: raw.score,
            bbox,
            direction,
            distance_m,
            alert: distance_m < self.config.proximity_alert_m,
            mask: None,
        })
    }

    fn frame_mask(&self, mask: &DetectMask) -> Result<BitVec, SkipReason> {
        resize_mask(&mask.bits, (mask.width, mask.height), self.frame_size)
            .map_err(|err| SkipReason::MaskMismatch(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::property::distance::DistanceStrategy;

    const FRAME: (u32, u32) = (640, 480);

    fn person(score: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> DetectResult {
        DetectResult::new(0, "person", score, BoundingBox::new(x1, y1, x2, y2))
    }

    #[test]
    fn low_confidence_detections_are_dropped() {
        let config = DetectionConfig::default();
        let outcome = DetectionFusion::new(&config, FRAME, None).fuse(&[vec![
            person(0.9, 10.0, 10.0, 50.0, 110.0),
            person(0.3, 100.0, 10.0, 150.0, 110.0),
        ]]);

        assert_eq!(outcome.detections.len(), 1);
        assert_eq!(outcome.detections[0].confidence, 0.9);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn boxes_are_clipped_before_measuring() {
        let config = DetectionConfig::default();
        let detection = DetectionFusion::new(&config, FRAME, None)
            .annotate(&person(0.8, -20.0, 430.0, 60.0, 530.0))
            .unwrap();

        assert_eq!(detection.bbox, BoundingBox::new(0.0, 430.0, 60.0, 480.0));
        assert!((detection.distance_m - 22.4).abs() < 1e-4);
        assert_eq!(detection.direction, DirectionCategory::Left);
        assert!(!detection.alert);
    }

    #[test]
    fn malformed_items_become_diagnostics() {
        let config = DetectionConfig::default();
        let outcome = DetectionFusion::new(&config, FRAME, None).fuse(&[
            vec![person(0.9, f32::NAN, 0.0, 10.0, 10.0)],
            vec![
                person(0.9, 50.0, 50.0, 40.0, 60.0),
                person(0.9, 700.0, 10.0, 720.0, 40.0),
                person(1.5, 0.0, 0.0, 10.0, 10.0),
                person(0.9, 300.0, 100.0, 340.0, 400.0),
            ],
        ]);

        assert_eq!(outcome.detections.len(), 1);
        let reasons = outcome
            .skipped
            .iter()
            .map(|diagnostic| (diagnostic.source.clone(), diagnostic.reason.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            reasons,
            vec![
                (ItemSource::Detection { detector: 0, index: 0 }, SkipReason::NonFiniteBox),
                (ItemSource::Detection { detector: 1, index: 0 }, SkipReason::InvertedBox),
                (ItemSource::Detection { detector: 1, index: 1 }, SkipReason::OutsideFrame),
                (ItemSource::Detection { detector: 1, index: 2 }, SkipReason::InvalidConfidence(1.5)),
            ]
        );
    }

    #[test]
    fn nearest_first_and_ties_keep_input_order() {
        let config = DetectionConfig {
            distance: DistanceStrategy::EmpiricalConstant { constant: 700.0 },
            ..DetectionConfig::default()
        };
        let outcome = DetectionFusion::new(&config, FRAME, None).fuse(&[
            vec![
                DetectResult::new(1, "far", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 70.0)),
                DetectResult::new(2, "tie-a", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 140.0)),
            ],
            vec![
                DetectResult::new(3, "tie-b", 0.9, BoundingBox::new(100.0, 0.0, 110.0, 140.0)),
                DetectResult::new(4, "near", 0.9, BoundingBox::new(0.0, 0.0, 10.0, 470.0)),
            ],
        ]);

        let labels = outcome
            .detections
            .iter()
            .map(|detection| detection.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["near", "tie-a", "tie-b", "far"]);
        assert!(outcome.alert);
        assert!(outcome.detections[0].alert);
        assert!(!outcome.detections[1].alert);
    }

    #[test]
    fn instance_masks_are_brought_to_frame_size() {
        let config = DetectionConfig::default();
        let mask = DetectMask {
            width: 2,
            height: 2,
            bits: bitvec![1, 0, 0, 0],
        };
        let broken = DetectMask {
            width: 3,
            height: 3,
            bits: bitvec![1, 0],
        };
        let outcome = DetectionFusion::new(&config, (4, 4), None).fuse(&[vec![
            person(0.9, 0.0, 0.0, 4.0, 4.0).with_mask(mask),
            person(0.9, 0.0, 0.0, 4.0, 4.0).with_mask(broken),
        ]]);

        assert_eq!(outcome.detections.len(), 2);
        let resized = outcome.detections[0].mask.as_ref().unwrap();
        assert_eq!(resized.count_ones(), 4);
        assert!(resized[0] && resized[5] && !resized[2]);
        assert!(outcome.detections[1].mask.is_none());
        assert_eq!(
            outcome.skipped[0].source,
            ItemSource::DetectionMask { detector: 0, index: 1 }
        );
    }
}
