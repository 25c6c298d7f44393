#![deny(missing_docs)]

//! Core library for docsum: summarize documents landing in S3 and index the summaries.

/// HTTP routing for notification delivery.
pub mod api;
/// Shared AWS settings.
pub mod aws;
/// Environment-driven configuration management.
pub mod config;
/// Pipeline error taxonomy.
pub mod error;
/// S3 event parsing.
pub mod event;
/// Text extraction and document analysis.
pub mod extract;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline metrics helpers.
pub mod metrics;
/// Chunking, summarization, and orchestration.
pub mod processing;
/// Search index integration.
pub mod search;
/// Object storage access.
pub mod storage;
/// Hosted LLM clients.
pub mod summarization;
