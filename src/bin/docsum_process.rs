//! Single-invocation entrypoint.
//!
//! Reads one S3 event document from a file (or stdin), runs the pipeline once, and prints the
//! `{status, message}` response as JSON. Logs go to stderr so stdout carries only that document.
//! The exit code is `0` for a `200` response and `1` otherwise, so the binary can sit behind any
//! trigger that redelivers on failure.
use anyhow::{Context, Result};
use clap::Parser;
use docsum::{
    config,
    error::PipelineError,
    logging,
    processing::{PipelineResponse, SummaryPipeline},
};
use std::{io::Read, path::PathBuf};

#[derive(Parser)]
#[command(
    name = "docsum-process",
    about = "Summarize the object named by an S3 event and index the summary"
)]
struct Cli {
    /// Path to the event JSON; `-` reads from stdin.
    #[arg(long, default_value = "-")]
    event: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init_tracing_to(logging::ConsoleTarget::Stderr);
    let cli = Cli::parse();
    let payload = read_event(&cli.event)?;

    let response = match build_pipeline().await {
        Ok(pipeline) => pipeline.handle_event(&payload).await,
        Err(error) => {
            tracing::error!(stage = error.stage(), error = %error, "Pipeline could not start");
            PipelineResponse::failure(&error)
        }
    };
    println!(
        "{}",
        serde_json::to_string(&response).context("failed to encode response")?
    );

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

async fn build_pipeline() -> Result<SummaryPipeline, PipelineError> {
    let config = config::load_config()?;
    SummaryPipeline::from_config(&config).await
}

fn read_event(path: &PathBuf) -> Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read event from stdin")?;
        return Ok(buffer);
    }
    std::fs::read(path).with_context(|| format!("failed to read event file {}", path.display()))
}
