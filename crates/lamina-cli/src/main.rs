//! Batch extraction from the command line.

use anyhow::Context;
use clap::Parser;
use lamina::pdf::PdfExtractorProvider;
use lamina::{
    BatchProcessor, ExtractionConfig, JsonResultWriter, ProviderRegistry, StructuralLayoutDetector,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lamina", version, about = "Layout-driven document extraction")]
struct Args {
    /// Directory containing the documents to process
    #[arg(short, long)]
    input: PathBuf,

    /// Directory receiving the extraction artifacts
    #[arg(short, long)]
    output: PathBuf,

    /// Descend into subdirectories of the input
    #[arg(short, long)]
    recursive: bool,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ExtractionConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ExtractionConfig::default(),
    };

    let mut registry = ProviderRegistry::new();
    registry.register(Arc::new(PdfExtractorProvider::new(config.clone())));

    let processor = BatchProcessor::new(
        Arc::new(registry),
        Arc::new(StructuralLayoutDetector::new()),
        Arc::new(JsonResultWriter::new()),
        config,
    );

    tracing::info!(
        input = %args.input.display(),
        output = %args.output.display(),
        recursive = args.recursive,
        "Starting extraction"
    );

    let summary = processor
        .process(&args.input, &args.output, args.recursive)
        .await
        .context("Batch processing failed")?;

    println!(
        "Processed {} file(s) ({} page(s)), {} failed",
        summary.files_processed, summary.total_pages, summary.files_failed
    );

    if summary.files_failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
