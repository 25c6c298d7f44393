//! Search index integration: summary documents and the OpenSearch writer.

mod client;
mod document;

pub use client::{IndexingError, OpenSearchIndex, SearchIndex, index_document};
pub use document::{DocumentMetadata, IndexDocument};
