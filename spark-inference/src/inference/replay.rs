//! Providers that hand back outputs recorded from a real model run.

use super::depth::DepthInference;
use super::detect::{DetectInference, DetectResult};
use anyhow::{bail, Result};
use log::debug;
use spark_media::{DepthMap, Image};

/// Returns the same depth map for every frame.
pub struct ReplayDepth {
    name: String,
    depth: DepthMap,
}

impl ReplayDepth {
    pub fn new(name: impl Into<String>, depth: DepthMap) -> Self {
        ReplayDepth {
            name: name.into(),
            depth,
        }
    }
}

impl DepthInference for ReplayDepth {
    fn name(&self) -> &str {
        &self.name
    }

    fn inference_depth(&self, _image: &Image) -> Result<DepthMap> {
        if self.depth.is_empty() {
            bail!("Recorded depth map of {} is empty", self.name);
        }
        Ok(self.depth.clone())
    }
}

/// Returns the same detections for every frame, filtered by the requested confidence.
pub struct ReplayDetect {
    name: String,
    results: Vec<DetectResult>,
}

impl ReplayDetect {
    pub fn new(name: impl Into<String>, results: Vec<DetectResult>) -> Self {
        ReplayDetect {
            name: name.into(),
            results,
        }
    }
}

impl DetectInference for ReplayDetect {
    fn name(&self) -> &str {
        &self.name
    }

    fn inference_detect(&self, _image: &Image, confidence: f32) -> Result<Vec<DetectResult>> {
        let results = self
            .results
            .iter()
            .filter(|result| result.score >= confidence)
            .cloned()
            .collect::<Vec<_>>();
        debug!(
            "{} replayed {} of {} detections",
            self.name,
            results.len(),
            self.results.len()
        );

        Ok(results)
    }
}
