//! Summary documents stored in the search index.

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Provenance of an indexed summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Bucket the source object was read from.
    pub s3_bucket: String,
    /// Key of the source object.
    pub s3_key: String,
    /// Extension of the source object including the dot, or empty.
    pub file_type: String,
}

/// Document body written to the index, keyed by `doc_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDocument {
    /// Document identity; equals the source object key.
    pub doc_id: String,
    /// Joined chunk summaries.
    pub summary: String,
    /// Source provenance.
    pub metadata: DocumentMetadata,
    /// RFC 3339 UTC instant at which the document was built for writing.
    pub timestamp: String,
}

impl IndexDocument {
    /// Build a document stamped with the current UTC time.
    pub fn new(doc_id: impl Into<String>, summary: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            doc_id: doc_id.into(),
            summary: summary.into(),
            metadata,
            timestamp: current_timestamp_rfc3339(),
        }
    }
}

/// Current UTC time formatted as RFC 3339.
pub(crate) fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| OffsetDateTime::now_utc().unix_timestamp().to_string())
}
