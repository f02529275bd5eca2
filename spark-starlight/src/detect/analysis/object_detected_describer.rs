use crate::detect::analysis::Describer;
use crate::detect::fusion::DetectionBox;
use crate::pipeline::FrameResult;

/// Objects farther than this are not announced.
pub const ANNOUNCE_MAX_DISTANCE_M: f32 = 10.0;
pub const ANNOUNCE_MAX_OBJECTS: usize = 2;

/// Names the nearest objects, e.g. `person left and chair center`.
///
/// `detections` must already be sorted nearest first, as fusion leaves them.
pub fn describe_nearest(detections: &[DetectionBox]) -> Option<String> {
    NearestObjectDescriber::default().describe_detections(detections)
}

#[derive(Debug, Clone)]
pub struct NearestObjectDescriber {
    pub max_distance_m: f32,
    pub limit: usize,
}

impl Default for NearestObjectDescriber {
    fn default() -> Self {
        NearestObjectDescriber {
            max_distance_m: ANNOUNCE_MAX_DISTANCE_M,
            limit: ANNOUNCE_MAX_OBJECTS,
        }
    }
}

impl NearestObjectDescriber {
    pub fn describe_detections(&self, detections: &[DetectionBox]) -> Option<String> {
        let parts = detections
            .iter()
            .filter(|detection| detection.distance_m <= self.max_distance_m)
            .take(self.limit)
            .map(|detection| format!("{} {}", detection.label, detection.direction))
            .collect::<Vec<_>>();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" and "))
        }
    }
}

impl Describer for NearestObjectDescriber {
    fn describe(&self, result: &FrameResult) -> Option<String> {
        self.describe_detections(&result.detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::property::direction::DirectionCategory;
    use spark_inference::BoundingBox;

    fn detection(label: &str, direction: DirectionCategory, distance_m: f32) -> DetectionBox {
        DetectionBox {
            class_id: 0,
            label: label.to_string(),
            confidence: 0.9,
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            direction,
            distance_m,
            alert: false,
            mask: None,
        }
    }

    #[test]
    fn two_nearest_within_range() {
        let detections = [
            detection("person", DirectionCategory::Left, 1.2),
            detection("chair", DirectionCategory::Center, 4.0),
            detection("car", DirectionCategory::Right, 6.0),
        ];

        assert_eq!(
            describe_nearest(&detections).as_deref(),
            Some("person left and chair center")
        );
    }

    #[test]
    fn far_objects_are_not_announced() {
        let detections = [detection("car", DirectionCategory::Right, 12.5)];
        assert_eq!(describe_nearest(&detections), None);
        assert_eq!(describe_nearest(&[]), None);
    }
}
