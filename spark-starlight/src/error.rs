use thiserror::Error;

/// Reasons a whole frame produced no result.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is empty ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("no depth map is available for this frame")]
    MissingDepth,
    #[error("depth provider {name} failed: {message}")]
    DepthProvider { name: String, message: String },
    #[error("failed to encode the overlay: {0}")]
    Encode(String),
    #[error("all {0} frame workers are busy")]
    Busy(usize),
    #[error("frame worker stopped unexpectedly: {0}")]
    Worker(String),
}
