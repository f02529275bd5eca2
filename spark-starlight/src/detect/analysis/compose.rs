use crate::detect::analysis::{DescriberDispatcher, Describer};
use crate::pipeline::FrameResult;

/// Joins the parts of every describer into one sentence.
pub struct CompositeDescriber {
    describers: Vec<DescriberDispatcher>,
}

impl Default for CompositeDescriber {
    fn default() -> Self {
        CompositeDescriber::new()
    }
}

impl CompositeDescriber {
    pub fn new() -> Self {
        CompositeDescriber {
            describers: DescriberDispatcher::all(),
        }
    }
}

impl Describer for CompositeDescriber {
    fn describe(&self, result: &FrameResult) -> Option<String> {
        let parts = self
            .describers
            .iter()
            .filter_map(|describer| describer.describe(result))
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();
        if parts.is_empty() {
            return None;
        }

        let mut description = parts.join(", ");
        if let Some(first) = description.get(..1) {
            description = first.to_uppercase() + &description[1..];
        }
        Some(description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StarlightConfig;
    use crate::pipeline::FrameProcessingPipeline;
    use spark_inference::{BoundingBox, DetectResult};
    use spark_media::{DepthMap, Image, RGB};

    #[test]
    fn objects_then_walls() -> anyhow::Result<()> {
        let pipeline = FrameProcessingPipeline::new(StarlightConfig::default());
        // Steep ramp over the right half of the frame.
        let depth = DepthMap::from_fn(320, 240, |x, _| if x < 160 { 0.0 } else { (x - 160) as f32 });
        let detections = vec![vec![DetectResult::new(
            0,
            "person",
            0.9,
            BoundingBox::new(20.0, 40.0, 60.0, 200.0),
        )]];

        let result = pipeline.process_frame(&Image::filled(320, 240, RGB(0, 0, 0)), Some(&depth), &detections)?;
        assert_eq!(
            CompositeDescriber::new().describe(&result).as_deref(),
            Some("Person left, wall on the right")
        );
        Ok(())
    }
}
