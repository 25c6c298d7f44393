//! Document processing pipeline: chunking, summarization, and orchestration.

pub mod chunking;
mod service;
pub mod summarize;
pub mod types;

pub use service::{PipelineApi, PipelineClients, PipelineSettings, SummaryPipeline};
pub use types::{Chunk, ChunkingError, PipelineResponse, ProcessingOutcome};
