//! Pipeline-level error taxonomy.
//!
//! Each stage owns its error enum; [`PipelineError`] wraps them so the entry point has a single
//! type to translate into a response.

use thiserror::Error;

use crate::{
    config::ConfigError, extract::ExtractionError, processing::ChunkingError,
    search::IndexingError, storage::RetrievalError, summarization::SummarizationClientError,
};

/// Terminal failure of one pipeline invocation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The trigger payload did not describe a usable object.
    #[error("Invalid notification: {0}")]
    Notification(String),
    /// Required configuration was missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),
    /// The configured summarization provider could not be initialized.
    #[error("Failed to initialize summarization provider: {0}")]
    ProviderSetup(#[source] SummarizationClientError),
    /// The object could not be fetched from storage.
    #[error("{0}")]
    Retrieval(#[from] RetrievalError),
    /// Text could not be extracted from the object.
    #[error("{0}")]
    Extraction(#[from] ExtractionError),
    /// The extracted text could not be split into chunks.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// A chunk summary could not be generated.
    #[error("Failed to summarize chunk {chunk}: {source}")]
    Summarization {
        /// Zero-based index of the failing chunk.
        chunk: usize,
        /// Underlying provider error.
        #[source]
        source: SummarizationClientError,
    },
    /// The summary document could not be written to the index.
    #[error("{0}")]
    Indexing(#[from] IndexingError),
}

impl PipelineError {
    /// Short stage label used in logs.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Notification(_) => "notification",
            Self::Configuration(_) | Self::ProviderSetup(_) => "configuration",
            Self::Retrieval(_) => "retrieval",
            Self::Extraction(_) => "extraction",
            Self::Chunking(_) => "chunking",
            Self::Summarization { .. } => "summarization",
            Self::Indexing(_) => "indexing",
        }
    }
}
