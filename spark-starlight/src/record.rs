//! Detections recorded as JSON, one file per detector.

use anyhow::{Context, Result};
use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use spark_inference::{BoundingBox, DetectMask, DetectResult};
use std::path::Path;

/// One detection in the same shape the frame report uses for objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    #[serde(default)]
    pub cls: u32,
    pub label: String,
    pub conf: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    #[serde(default)]
    pub mask: Option<MaskRecord>,
}

/// Row-major instance mask, any resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskRecord {
    pub width: u32,
    pub height: u32,
    /// Non-zero entries are set.
    pub data: Vec<u8>,
}

impl From<DetectionRecord> for DetectResult {
    fn from(record: DetectionRecord) -> Self {
        let result = DetectResult::new(
            record.cls,
            record.label,
            record.conf,
            BoundingBox::new(record.x1, record.y1, record.x2, record.y2),
        );

        match record.mask {
            Some(mask) => result.with_mask(DetectMask {
                width: mask.width,
                height: mask.height,
                bits: mask.data.iter().map(|value| *value != 0).collect::<BitVec>(),
            }),
            None => result,
        }
    }
}

pub fn parse_detections(raw: &str) -> Result<Vec<DetectResult>> {
    let records: Vec<DetectionRecord> = serde_json::from_str(raw)?;
    Ok(records.into_iter().map(DetectResult::from).collect())
}

pub fn load_detections(path: impl AsRef<Path>) -> Result<Vec<DetectResult>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read detections {}", path.display()))?;
    parse_detections(&raw).with_context(|| format!("Invalid detections file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_become_detect_results() -> Result<()> {
        let results = parse_detections(
            r#"[
                {"cls": 0, "label": "person", "conf": 0.91, "x1": 10, "y1": 20, "x2": 50, "y2": 220},
                {"label": "chair", "conf": 0.5, "x1": 1.5, "y1": 2, "x2": 3, "y2": 4,
                 "mask": {"width": 2, "height": 1, "data": [0, 255]}}
            ]"#,
        )?;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].bbox, BoundingBox::new(10.0, 20.0, 50.0, 220.0));
        assert!(results[0].mask.is_none());

        let mask = results[1].mask.as_ref().unwrap();
        assert_eq!(results[1].class_id, 0);
        assert_eq!((mask.width, mask.height), (2, 1));
        assert!(!mask.bits[0] && mask.bits[1]);
        Ok(())
    }

    #[test]
    fn malformed_files_are_errors() {
        assert!(parse_detections("{\"label\": \"person\"}").is_err());
    }
}
