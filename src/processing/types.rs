//! Core data types and error definitions for the processing pipeline.

use serde::Serialize;
use thiserror::Error;

use crate::error::PipelineError;

/// Errors produced while turning extracted text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Ingestion configured an impossible chunk budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap must leave room for new text in every chunk.
    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    InvalidOverlap {
        /// Requested overlap in characters.
        overlap: usize,
        /// Requested chunk size in characters.
        chunk_size: usize,
    },
}

/// Contiguous slice of the extracted text sized for one LLM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk contents.
    pub text: String,
    /// Character offset of the chunk within the source text.
    pub start: usize,
    /// Number of leading characters repeated from the previous chunk.
    pub overlap: usize,
}

impl Chunk {
    /// Character length of the chunk.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Portion of the chunk that does not repeat the previous chunk.
    pub fn fresh_text(&self) -> &str {
        match self.text.char_indices().nth(self.overlap) {
            Some((offset, _)) => &self.text[offset..],
            None if self.overlap == 0 => &self.text,
            None => "",
        }
    }
}

/// Summary of a completed run produced by [`crate::processing::SummaryPipeline::process`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingOutcome {
    /// Identifier the summary was indexed under.
    pub doc_id: String,
    /// Extension of the processed object.
    pub file_type: String,
    /// Characters of extracted text.
    pub extracted_chars: usize,
    /// Number of chunks summarized.
    pub chunk_count: usize,
    /// Characters of the final summary.
    pub summary_chars: usize,
}

/// Structured outcome of one invocation, ready for a transport boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResponse {
    /// `200` on success, `500` on any failure.
    pub status: u16,
    /// Human-readable description of the outcome.
    pub message: String,
}

impl PipelineResponse {
    /// Response for a fully indexed object.
    pub fn success(key: &str) -> Self {
        Self {
            status: 200,
            message: format!("Successfully processed and summarized {key}"),
        }
    }

    /// Response for a failed invocation, carrying the error text.
    pub fn failure(error: &PipelineError) -> Self {
        Self {
            status: 500,
            message: format!("Error processing file: {error}"),
        }
    }

    /// Whether the invocation succeeded.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}
