use anyhow::Result;
use spark_media::{DepthMap, Image};

/// Dense monocular depth estimation.
///
/// Calls are synchronous and blocking. The returned map may have any
/// resolution; consumers resample it to the frame they work on. An error
/// means no depth is available for this frame at all.
pub trait DepthInference: Send + Sync {
    fn name(&self) -> &str;

    fn inference_depth(&self, image: &Image) -> Result<DepthMap>;
}
