#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::json;
use spark_inference::inference::replay::{ReplayDepth, ReplayDetect};
use spark_inference::{DepthInference, DetectInference};
use spark_media::{DepthMap, Image};
use spark_starlight::config::CONFIG_ENV;
use spark_starlight::detect::analysis::{CompositeDescriber, Describer};
use spark_starlight::record::load_detections;
use spark_starlight::{FrameProcessingPipeline, FrameService, StarlightConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Runs one recorded frame through wall segmentation, detection fusion and the overlay.
#[derive(Debug, Parser)]
#[command(name = "spark-starlight", version)]
struct Args {
    /// Frame to annotate (PNG or JPEG).
    #[arg(long)]
    image: PathBuf,

    /// Depth map for the frame as a grayscale image, white is farthest.
    #[arg(long)]
    depth: PathBuf,

    /// JSON list of detections; repeat once per detector.
    #[arg(long = "detections")]
    detections: Vec<PathBuf>,

    /// TOML configuration file.
    #[arg(long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Where the annotated JPEG is written.
    #[arg(long, default_value = "overlay.jpg")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = StarlightConfig::load(args.config.as_deref())?;
    let quality = config.overlay.jpeg_quality;

    let image = Image::open_file(&args.image)?;
    let depth: Arc<dyn DepthInference> =
        Arc::new(ReplayDepth::new("recorded-depth", DepthMap::open_file(&args.depth)?));
    let detectors = args
        .detections
        .iter()
        .map(|path| -> Result<Arc<dyn DetectInference>> {
            let name = path.display().to_string();
            Ok(Arc::new(ReplayDetect::new(name, load_detections(path)?)))
        })
        .collect::<Result<Vec<_>>>()?;
    info!(
        "Processing {} ({}x{}) with {} detectors",
        args.image.display(),
        image.get_width(),
        image.get_height(),
        detectors.len()
    );

    let service = FrameService::new(FrameProcessingPipeline::new(config), Some(depth), detectors);
    let result = service.submit(image).await?;

    let jpeg = result.encode_overlay(quality)?;
    std::fs::write(&args.output, jpeg)
        .with_context(|| format!("Failed to write overlay to {}", args.output.display()))?;
    info!("Overlay written to {}", args.output.display());

    let report = json!({
        "result": result.report(),
        "description": CompositeDescriber::new().describe(&result),
        "overlay": args.output.display().to_string(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
