//! Object storage access.
//!
//! [`ObjectStore`] is the seam between the pipeline and S3 so that tests can substitute an
//! in-memory store. [`S3ObjectStore`] issues a single `GetObject` per fetch; retries are left
//! to the SDK's own defaults.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

use crate::event::file_extension;

/// Errors raised while reading an object from storage.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Bucket or key does not exist.
    #[error("Object s3://{bucket}/{key} not found: {message}")]
    NotFound {
        /// Requested bucket.
        bucket: String,
        /// Requested key.
        key: String,
        /// Service-provided detail.
        message: String,
    },
    /// Request was rejected or could not be sent.
    #[error("Failed to download s3://{bucket}/{key}: {message}")]
    Request {
        /// Requested bucket.
        bucket: String,
        /// Requested key.
        key: String,
        /// Service or transport detail.
        message: String,
    },
    /// Response body could not be read to completion.
    #[error("Failed to read body of s3://{bucket}/{key}: {message}")]
    Body {
        /// Requested bucket.
        bucket: String,
        /// Requested key.
        key: String,
        /// Stream error detail.
        message: String,
    },
}

/// Raw object payload together with the extension of its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContent {
    /// Object bytes as stored.
    pub bytes: Vec<u8>,
    /// Key extension including the leading dot, or empty.
    pub extension: String,
}

impl RawContent {
    /// Pair a payload with the extension derived from its object key.
    pub fn for_key(key: &str, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            extension: file_extension(key),
        }
    }
}

/// Read access to stored objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch the object identified by `bucket` and `key`.
    async fn fetch(&self, bucket: &str, key: &str) -> Result<RawContent, RetrievalError>;
}

/// [`ObjectStore`] backed by Amazon S3.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Build a store from shared AWS settings.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn fetch(&self, bucket: &str, key: &str) -> Result<RawContent, RetrievalError> {
        tracing::debug!(bucket, key, "Downloading object");
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|error| {
                let message = DisplayErrorContext(&error).to_string();
                let service = error.into_service_error();
                let missing = service.is_no_such_key() || service.code() == Some("NoSuchBucket");
                tracing::error!(bucket, key, error = %message, "Error downloading from S3");
                if missing {
                    RetrievalError::NotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message,
                    }
                } else {
                    RetrievalError::Request {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                        message,
                    }
                }
            })?;

        let bytes = output.body.collect().await.map_err(|error| {
            tracing::error!(bucket, key, error = %error, "Error reading S3 object body");
            RetrievalError::Body {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: error.to_string(),
            }
        })?;
        let bytes = bytes.into_bytes().to_vec();
        tracing::debug!(bucket, key, size = bytes.len(), "Downloaded object");

        Ok(RawContent::for_key(key, bytes))
    }
}
