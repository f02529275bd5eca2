use crate::detect::diagnostics::{Diagnostic, ItemSource, SkipReason};
use crate::error::FrameError;
use crate::pipeline::{FrameProcessingPipeline, FrameResult};
use futures::future::join_all;
use log::{debug, warn};
use spark_inference::{DepthInference, DetectInference, DetectResult};
use spark_media::Image;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::spawn_blocking;

/// Runs frames through the providers and the pipeline, at most `workers` at a time.
///
/// A frame arriving while every worker is busy is rejected with
/// [`FrameError::Busy`] rather than queued.
pub struct FrameService {
    pipeline: Arc<FrameProcessingPipeline>,
    depth: Option<Arc<dyn DepthInference>>,
    detectors: Vec<Arc<dyn DetectInference>>,
    permits: Arc<Semaphore>,
    workers: usize,
}

impl FrameService {
    pub fn new(
        pipeline: FrameProcessingPipeline,
        depth: Option<Arc<dyn DepthInference>>,
        detectors: Vec<Arc<dyn DetectInference>>,
    ) -> Self {
        let workers = pipeline.config().service.workers.max(1);
        FrameService {
            pipeline: Arc::new(pipeline),
            depth,
            detectors,
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn pipeline(&self) -> &FrameProcessingPipeline {
        &self.pipeline
    }

    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }

    pub async fn submit(&self, image: Image) -> Result<FrameResult, FrameError> {
        // Held by every blocking task: the worker stays taken until the last
        // one returns, even if this future is dropped.
        let permit = Arc::new(
            self.permits
                .clone()
                .try_acquire_owned()
                .map_err(|_| FrameError::Busy(self.workers))?,
        );
        let depth_provider = self.depth.clone().ok_or(FrameError::MissingDepth)?;
        let image = Arc::new(image);

        let depth_task = {
            let image = image.clone();
            let permit = permit.clone();
            spawn_blocking(move || {
                let _permit = permit;
                let name = depth_provider.name().to_string();
                (name, depth_provider.inference_depth(&image))
            })
        };
        let confidence = self.pipeline.config().detection.confidence_threshold;
        let detect_tasks = self.detectors.iter().map(|detector| {
            let detector = detector.clone();
            let image = image.clone();
            let permit = permit.clone();
            spawn_blocking(move || {
                let _permit = permit;
                let name = detector.name().to_string();
                (name, detector.inference_detect(&image, confidence))
            })
        });

        let (depth_result, detect_results) = tokio::join!(depth_task, join_all(detect_tasks));

        let (depth_name, depth) = depth_result.map_err(|err| FrameError::Worker(err.to_string()))?;
        let depth = depth.map_err(|err| FrameError::DepthProvider {
            name: depth_name,
            message: format!("{:#}", err),
        })?;

        let mut provider_diagnostics = Vec::new();
        let mut lists: Vec<Vec<DetectResult>> = Vec::with_capacity(detect_results.len());
        for (detector, joined) in detect_results.into_iter().enumerate() {
            let reason = match joined {
                Ok((_, Ok(list))) => {
                    lists.push(list);
                    continue;
                }
                Ok((name, Err(err))) => format!("{}: {:#}", name, err),
                Err(err) => err.to_string(),
            };
            warn!("Detector {} produced no detections: {}", detector, reason);
            provider_diagnostics.push(Diagnostic::new(
                ItemSource::Detector { detector },
                SkipReason::DetectorFailed(reason),
            ));
            lists.push(Vec::new());
        }

        let pipeline = self.pipeline.clone();
        let mut result = spawn_blocking(move || {
            let _permit = permit;
            pipeline.process_frame(&image, Some(&depth), &lists)
        })
        .await
        .map_err(|err| FrameError::Worker(err.to_string()))??;

        provider_diagnostics.append(&mut result.diagnostics);
        result.diagnostics = provider_diagnostics;
        debug!(
            "Frame done with {} detectors, {} diagnostics",
            self.detectors.len(),
            result.diagnostics.len()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StarlightConfig;
    use anyhow::{bail, Result};
    use spark_inference::inference::replay::{ReplayDepth, ReplayDetect};
    use spark_inference::BoundingBox;
    use spark_media::{DepthMap, RGB};

    struct FailingDetect;

    impl DetectInference for FailingDetect {
        fn name(&self) -> &str {
            "failing"
        }

        fn inference_detect(&self, _image: &Image, _confidence: f32) -> Result<Vec<DetectResult>> {
            bail!("model not loaded")
        }
    }

    fn depth() -> Arc<dyn DepthInference> {
        Arc::new(ReplayDepth::new("flat", DepthMap::from_fn(32, 24, |_, _| 0.5)))
    }

    #[tokio::test]
    async fn no_detectors_yield_an_empty_list() -> Result<()> {
        let service = FrameService::new(
            FrameProcessingPipeline::new(StarlightConfig::default()),
            Some(depth()),
            Vec::new(),
        );

        let result = service.submit(Image::filled(32, 24, RGB(0, 0, 0))).await?;
        assert!(result.detections.is_empty());
        assert!(!result.alert);
        assert_eq!(service.available_workers(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn failing_detectors_are_reported_not_fatal() -> Result<()> {
        let replay = ReplayDetect::new(
            "recorded",
            vec![DetectResult::new(0, "person", 0.9, BoundingBox::new(1.0, 1.0, 5.0, 20.0))],
        );
        let detectors: Vec<Arc<dyn DetectInference>> = vec![Arc::new(FailingDetect), Arc::new(replay)];
        let service = FrameService::new(
            FrameProcessingPipeline::new(StarlightConfig::default()),
            Some(depth()),
            detectors,
        );

        let result = service.submit(Image::filled(32, 24, RGB(0, 0, 0))).await?;
        assert_eq!(result.detections.len(), 1);
        assert_eq!(
            result.diagnostics[0].source,
            ItemSource::Detector { detector: 0 }
        );
        Ok(())
    }

    #[tokio::test]
    async fn missing_depth_provider_fails_the_frame() {
        let service = FrameService::new(
            FrameProcessingPipeline::new(StarlightConfig::default()),
            None,
            Vec::new(),
        );

        let result = service.submit(Image::filled(8, 8, RGB(0, 0, 0))).await;
        assert!(matches!(result, Err(FrameError::MissingDepth)));
    }
}
