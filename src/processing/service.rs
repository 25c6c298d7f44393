//! Pipeline service sequencing fetch, extraction, summarization, and indexing.

use crate::{
    aws::load_sdk_config,
    config::Config,
    error::PipelineError,
    event::Notification,
    extract::{DocumentAnalyzer, TextractAnalyzer, extract_text},
    metrics::{MetricsSnapshot, PipelineMetrics},
    processing::{
        chunking::chunk_text,
        summarize::{SummarySettings, join_summaries, summarize_chunks},
        types::{PipelineResponse, ProcessingOutcome},
    },
    search::{DocumentMetadata, IndexDocument, OpenSearchIndex, SearchIndex, index_document},
    storage::{ObjectStore, S3ObjectStore},
    summarization::{SummarizationClient, build_summarization_client},
};
use async_trait::async_trait;
use std::sync::Arc;

/// External collaborators used by the pipeline.
///
/// None of them hold mutable state, so one set can serve concurrent invocations.
#[derive(Clone)]
pub struct PipelineClients {
    /// Object storage reader.
    pub store: Arc<dyn ObjectStore>,
    /// OCR / document-analysis service.
    pub analyzer: Arc<dyn DocumentAnalyzer>,
    /// Hosted LLM used for chunk summaries.
    pub summarizer: Arc<dyn SummarizationClient>,
    /// Search index receiving summary documents.
    pub index: Arc<dyn SearchIndex>,
}

/// Tunables applied to every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Index receiving summary documents.
    pub index_name: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub chunk_overlap: usize,
    /// Model settings for chunk summaries.
    pub summary: SummarySettings,
}

impl PipelineSettings {
    /// Derive settings from loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            index_name: config.opensearch_index.clone(),
            chunk_size: config.text_splitter_chunk_size,
            chunk_overlap: config.text_splitter_chunk_overlap,
            summary: SummarySettings {
                model: config.summarization_model.clone(),
                max_tokens: config.summarization_max_tokens,
            },
        }
    }
}

/// Abstraction over the pipeline used by transport surfaces (HTTP, CLI).
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Process one raw S3 event document and describe the outcome.
    async fn handle_event(&self, payload: &[u8]) -> PipelineResponse;

    /// Retrieve the current metrics snapshot.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Runs notification → fetch → extract → chunk + summarize → index.
///
/// Every stage runs to completion before the next begins. The first failing stage ends the
/// invocation; work already done is discarded and nothing is retried.
pub struct SummaryPipeline {
    clients: PipelineClients,
    settings: PipelineSettings,
    metrics: Arc<PipelineMetrics>,
}

impl SummaryPipeline {
    /// Assemble a pipeline from explicit collaborators.
    pub fn new(clients: PipelineClients, settings: PipelineSettings) -> Self {
        Self {
            clients,
            settings,
            metrics: Arc::new(PipelineMetrics::new()),
        }
    }

    /// Build AWS-backed collaborators from configuration.
    pub async fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let sdk_config = load_sdk_config(config).await;
        let summarizer = build_summarization_client(config, &sdk_config).map_err(|error| {
            tracing::error!(
                provider = ?config.summarization_provider,
                error = %error,
                "Failed to build summarization client"
            );
            PipelineError::ProviderSetup(error)
        })?;
        let index = OpenSearchIndex::new(&config.opensearch_url(), &sdk_config)?;
        tracing::info!(
            provider = ?config.summarization_provider,
            index = %config.opensearch_index,
            "Pipeline clients initialized"
        );

        let clients = PipelineClients {
            store: Arc::new(S3ObjectStore::new(&sdk_config)),
            analyzer: Arc::new(TextractAnalyzer::new(&sdk_config)),
            summarizer: Arc::from(summarizer),
            index: Arc::new(index),
        };
        Ok(Self::new(clients, PipelineSettings::from_config(config)))
    }

    /// Settings applied to each invocation.
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run every stage for one notification.
    pub async fn process(
        &self,
        notification: &Notification,
    ) -> Result<ProcessingOutcome, PipelineError> {
        let Notification { bucket, key } = notification;
        tracing::info!(bucket = %bucket, key = %key, "Processing file");

        let content = self.clients.store.fetch(bucket, key).await?;
        let file_type = content.extension.clone();

        let text = extract_text(content, self.clients.analyzer.as_ref()).await?;
        let extracted_chars = text.chars().count();
        tracing::debug!(key = %key, file_type = %file_type, extracted_chars, "Extracted text");

        let chunks = chunk_text(&text, self.settings.chunk_size, self.settings.chunk_overlap)
            .map_err(|error| {
                tracing::error!(key = %key, error = %error, "Error chunking text");
                error
            })?;
        let summaries = summarize_chunks(
            self.clients.summarizer.as_ref(),
            &self.settings.summary,
            &chunks,
        )
        .await?;
        debug_assert_eq!(summaries.len(), chunks.len());
        let summary = join_summaries(&summaries);

        let metadata = DocumentMetadata {
            s3_bucket: bucket.clone(),
            s3_key: key.clone(),
            file_type: file_type.clone(),
        };
        let document = IndexDocument::new(key.clone(), summary, metadata);
        index_document(
            self.clients.index.as_ref(),
            &self.settings.index_name,
            &document,
        )
        .await?;

        self.metrics.record_document(chunks.len() as u64);
        let outcome = ProcessingOutcome {
            doc_id: document.doc_id,
            file_type,
            extracted_chars,
            chunk_count: chunks.len(),
            summary_chars: document.summary.chars().count(),
        };
        tracing::info!(
            key = %key,
            chunks = outcome.chunk_count,
            summary_chars = outcome.summary_chars,
            "Document summarized and indexed"
        );
        Ok(outcome)
    }

    /// Parse an S3 event document, process its first record, and describe the outcome.
    pub async fn handle_event(&self, payload: &[u8]) -> PipelineResponse {
        let result = match Notification::from_json(payload) {
            Ok(notification) => self
                .process(&notification)
                .await
                .map(|outcome| (notification, outcome)),
            Err(error) => Err(error),
        };

        match result {
            Ok((notification, _)) => PipelineResponse::success(&notification.key),
            Err(error) => {
                self.metrics.record_failure();
                tracing::error!(stage = error.stage(), error = %error, "Error in pipeline invocation");
                PipelineResponse::failure(&error)
            }
        }
    }

    /// Return the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl PipelineApi for SummaryPipeline {
    async fn handle_event(&self, payload: &[u8]) -> PipelineResponse {
        SummaryPipeline::handle_event(self, payload).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryPipeline::metrics_snapshot(self)
    }
}
