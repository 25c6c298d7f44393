//! S3 change notifications.
//!
//! Only the subset of the S3 event document the pipeline reads is modelled: the bucket name and
//! object key of each record. Unknown fields are ignored.

use serde::Deserialize;
use std::path::Path;

use crate::error::PipelineError;

/// S3 event document delivered by the storage trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Event {
    /// Records carried by the event, in delivery order.
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

/// One object change inside an [`S3Event`].
#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    /// Storage entity affected by the change.
    pub s3: S3Entity,
}

/// Bucket and object descriptors of a record.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    /// Bucket holding the object.
    pub bucket: S3Bucket,
    /// Object that changed.
    pub object: S3Object,
}

/// Bucket descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    /// Bucket name.
    pub name: String,
}

/// Object descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    /// Object key, possibly containing path separators.
    pub key: String,
    /// Object size in bytes, when reported.
    #[serde(default)]
    pub size: Option<u64>,
}

/// The object a pipeline invocation works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

impl Notification {
    /// Build a notification from explicit bucket and key values.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Result<Self, PipelineError> {
        let bucket = bucket.into();
        let key = key.into();
        if bucket.is_empty() {
            return Err(PipelineError::Notification("bucket name is empty".into()));
        }
        if key.is_empty() {
            return Err(PipelineError::Notification("object key is empty".into()));
        }
        Ok(Self { bucket, key })
    }

    /// Parse a raw event document and take its first record.
    pub fn from_json(payload: &[u8]) -> Result<Self, PipelineError> {
        let event: S3Event = serde_json::from_slice(payload)
            .map_err(|error| PipelineError::Notification(format!("malformed event: {error}")))?;
        Self::from_event(event)
    }

    /// Take the first record of an event. Remaining records are not processed.
    pub fn from_event(event: S3Event) -> Result<Self, PipelineError> {
        let total = event.records.len();
        let record = event
            .records
            .into_iter()
            .next()
            .ok_or_else(|| PipelineError::Notification("event contains no records".into()))?;
        if total > 1 {
            tracing::debug!(ignored = total - 1, "Ignoring additional event records");
        }
        Self::new(record.s3.bucket.name, record.s3.object.key)
    }

    /// Extension of the object key including the leading dot, or an empty string.
    pub fn file_extension(&self) -> String {
        file_extension(&self.key)
    }
}

/// Extension of the last path segment of `key`, including the leading dot.
///
/// A hidden-file prefix such as `.env` is not an extension.
pub fn file_extension(key: &str) -> String {
    Path::new(key)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}
