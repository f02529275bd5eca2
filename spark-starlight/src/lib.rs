pub mod config;
pub mod detect;
pub mod error;
pub mod overlay;
pub mod pipeline;
pub mod record;
pub mod service;

pub use config::StarlightConfig;
pub use error::FrameError;
pub use pipeline::{process_frame, FrameProcessingPipeline, FrameReport, FrameResult};
pub use service::FrameService;
