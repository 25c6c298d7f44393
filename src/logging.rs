//! Tracing configuration and log routing.
//!
//! Logs go to the console (stdout for the server, stderr for binaries whose stdout carries a
//! result) using a compact formatter. When `DOCSUM_LOG_FILE` is set, the same events are appended
//! to that path through a non‑blocking writer.
use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, writer::BoxMakeWriter},
    prelude::*,
};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "DOCSUM_LOG_FILE";

/// Stream receiving console log output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConsoleTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error, leaving stdout free for machine-readable output.
    Stderr,
}

impl ConsoleTarget {
    fn make_writer(self) -> BoxMakeWriter {
        match self {
            Self::Stdout => BoxMakeWriter::new(std::io::stdout),
            Self::Stderr => BoxMakeWriter::new(std::io::stderr),
        }
    }
}

/// Configure tracing subscribers for stdout and optional file logging.
pub fn init_tracing() {
    init_tracing_to(ConsoleTarget::Stdout);
}

/// Configure tracing subscribers for the given console stream and optional file logging.
///
/// - Respects `RUST_LOG` for filtering (defaults to `info`).
/// - Installs a compact console layer and, when requested, a file layer.
/// - Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing_to(console: ConsoleTarget) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = fmt::layer()
        .with_writer(console.make_writer())
        .with_target(false)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let result = if let Some(writer) = configure_file_writer() {
        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_ansi(false)
            .compact();

        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    if let Err(err) = result {
        eprintln!("Tracing already initialized: {err}");
    }
}

/// Build a non‑blocking writer for file logging.
///
/// Returns `None` when no log file is configured or the file cannot be opened.
fn configure_file_writer() -> Option<NonBlocking> {
    let path = std::env::var(LOG_FILE_ENV).ok()?;
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);
            Some(non_blocking)
        }
        Err(err) => {
            eprintln!("Failed to open log file {path}: {err}");
            None
        }
    }
}
