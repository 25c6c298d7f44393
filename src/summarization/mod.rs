//! Hosted LLM clients used to summarize chunks.
//!
//! Amazon Bedrock is the production backend and is reached through the Converse API. A local
//! Ollama runtime can stand in during development; that adapter issues HTTP requests directly.

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while generating a summary.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider could not be reached.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to the summarization provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarizationRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Fully rendered prompt.
    pub prompt: String,
    /// Maximum number of tokens to generate.
    pub max_tokens: u32,
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a summary for a single prompt.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Build the summarization client selected by configuration.
pub fn build_summarization_client(
    config: &Config,
    sdk_config: &aws_config::SdkConfig,
) -> Result<Box<dyn SummarizationClient>, SummarizationClientError> {
    match config.summarization_provider {
        SummarizationProvider::Bedrock => Ok(Box::new(BedrockSummarizationClient::new(sdk_config))),
        SummarizationProvider::Ollama => {
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            Ok(Box::new(OllamaSummarizationClient::new(base_url)?))
        }
    }
}

/// Amazon Bedrock client using the Converse API.
pub struct BedrockSummarizationClient {
    client: aws_sdk_bedrockruntime::Client,
}

impl BedrockSummarizationClient {
    /// Build a client from shared AWS settings.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_bedrockruntime::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SummarizationClient for BedrockSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let message = Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(request.prompt))
            .build()
            .map_err(|error| SummarizationClientError::GenerationFailed(error.to_string()))?;

        let response = self
            .client
            .converse()
            .model_id(&request.model)
            .messages(message)
            .inference_config(
                InferenceConfiguration::builder()
                    .max_tokens(i32::try_from(request.max_tokens).unwrap_or(i32::MAX))
                    .build(),
            )
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::GenerationFailed(format!(
                    "Bedrock model {} failed: {}",
                    request.model,
                    error.into_service_error()
                ))
            })?;

        let output_message = response
            .output()
            .and_then(|output| output.as_message().ok())
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse("no message in Bedrock response".into())
            })?;

        let text = output_message
            .content()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(text.trim().to_string())
    }
}

/// Ollama client issuing non-streaming `/api/generate` requests.
pub struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
}

impl OllamaSummarizationClient {
    /// Build a client targeting the given Ollama base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("docsum/summary")
            .build()
            .map_err(|error| SummarizationClientError::ProviderUnavailable(error.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
                "num_predict": request.max_tokens,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}
