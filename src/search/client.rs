//! OpenSearch client wrapper.

use async_trait::async_trait;
use opensearch::{
    IndexParts, OpenSearch,
    auth::Credentials,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use super::document::IndexDocument;

/// Service name used when signing requests for Amazon OpenSearch Service.
const SIGNING_SERVICE: &str = "es";

/// Errors raised while writing to the search index.
#[derive(Debug, Error)]
pub enum IndexingError {
    /// Client could not be configured for the endpoint.
    #[error("Failed to connect to search index: {0}")]
    Connection(String),
    /// Request could not be sent or the response could not be read.
    #[error("Search index request failed: {0}")]
    Transport(String),
    /// Index answered with a non-success status.
    #[error("Search index rejected document {doc_id} with status {status}: {body}")]
    Rejected {
        /// Document that was being written.
        doc_id: String,
        /// HTTP status returned by the index.
        status: u16,
        /// Response body returned by the index.
        body: String,
    },
    /// Document could not be serialized.
    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Write access to a document index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Insert `body` under `doc_id`, replacing any existing document with that id.
    async fn upsert(&self, index: &str, doc_id: &str, body: Value) -> Result<(), IndexingError>;
}

/// Write a summary document into `index_name` with exactly one upsert call.
pub async fn index_document(
    index: &dyn SearchIndex,
    index_name: &str,
    document: &IndexDocument,
) -> Result<(), IndexingError> {
    let body = serde_json::to_value(document)?;
    match index.upsert(index_name, &document.doc_id, body).await {
        Ok(()) => {
            tracing::info!(index = index_name, doc_id = %document.doc_id, "Successfully indexed document");
            Ok(())
        }
        Err(error) => {
            tracing::error!(
                index = index_name,
                doc_id = %document.doc_id,
                error = %error,
                "Error indexing document"
            );
            Err(error)
        }
    }
}

/// [`SearchIndex`] backed by OpenSearch with AWS SigV4 request signing.
pub struct OpenSearchIndex {
    client: OpenSearch,
}

impl OpenSearchIndex {
    /// Connect to `url`, signing requests with the credentials and region in `sdk_config`.
    pub fn new(url: &str, sdk_config: &aws_config::SdkConfig) -> Result<Self, IndexingError> {
        let parsed_url = Url::parse(url).map_err(|e| IndexingError::Connection(e.to_string()))?;
        let credentials: Credentials = sdk_config
            .clone()
            .try_into()
            .map_err(|e| IndexingError::Connection(format!("{e}")))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let transport = TransportBuilder::new(conn_pool)
            .auth(credentials)
            .service_name(SIGNING_SERVICE)
            .disable_proxy()
            .build()
            .map_err(|e| IndexingError::Connection(e.to_string()))?;

        tracing::debug!(url = %url, "Created OpenSearch client");
        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }
}

#[async_trait]
impl SearchIndex for OpenSearchIndex {
    async fn upsert(&self, index: &str, doc_id: &str, body: Value) -> Result<(), IndexingError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, doc_id))
            .body(body)
            .send()
            .await
            .map_err(|e| IndexingError::Transport(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                IndexingError::Transport(format!(
                    "failed to read {} response body: {e}",
                    status.as_u16()
                ))
            })?;
            return Err(IndexingError::Rejected {
                doc_id: doc_id.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(index, doc_id, status = %status, "Index request acknowledged");
        Ok(())
    }
}
