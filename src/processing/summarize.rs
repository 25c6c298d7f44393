//! Per-chunk summarization.

use crate::error::PipelineError;
use crate::summarization::{SummarizationClient, SummarizationRequest};

use super::types::Chunk;

/// Model settings applied to every chunk prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySettings {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Generation budget per chunk.
    pub max_tokens: u32,
}

/// Render the fixed summarization prompt around a chunk.
pub fn build_chunk_prompt(chunk: &str) -> String {
    format!(
        "Please summarize the following text in 3-5 sentences, focusing on the key points:\n\n{chunk}\n\nSummary:"
    )
}

/// Summarize chunks one at a time, in order.
///
/// Stops at the first failing chunk; no partial result is returned.
pub async fn summarize_chunks(
    client: &dyn SummarizationClient,
    settings: &SummarySettings,
    chunks: &[Chunk],
) -> Result<Vec<String>, PipelineError> {
    let mut summaries = Vec::with_capacity(chunks.len());

    for (index, chunk) in chunks.iter().enumerate() {
        let request = SummarizationRequest {
            model: settings.model.clone(),
            prompt: build_chunk_prompt(&chunk.text),
            max_tokens: settings.max_tokens,
        };
        let summary = client.generate_summary(request).await.map_err(|source| {
            tracing::error!(
                chunk = index,
                chunks = chunks.len(),
                model = %settings.model,
                error = %source,
                "Error generating chunk summary"
            );
            PipelineError::Summarization {
                chunk: index,
                source,
            }
        })?;
        tracing::debug!(
            chunk = index,
            chunk_chars = chunk.char_len(),
            summary_chars = summary.chars().count(),
            "Chunk summarized"
        );
        summaries.push(summary);
    }

    Ok(summaries)
}

/// Join per-chunk summaries with single spaces, preserving chunk order.
pub fn join_summaries(summaries: &[String]) -> String {
    summaries.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::SummarizationClientError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedClient {
        prompts: Mutex<Vec<String>>,
        fail_on: Option<usize>,
    }

    impl ScriptedClient {
        fn new(fail_on: Option<usize>) -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
                fail_on,
            }
        }
    }

    #[async_trait]
    impl SummarizationClient for ScriptedClient {
        async fn generate_summary(
            &self,
            request: SummarizationRequest,
        ) -> Result<String, SummarizationClientError> {
            let mut prompts = self.prompts.lock().unwrap();
            let call = prompts.len();
            prompts.push(request.prompt);
            if self.fail_on == Some(call) {
                return Err(SummarizationClientError::GenerationFailed(
                    "throttled".into(),
                ));
            }
            Ok(format!("summary-{call}"))
        }
    }

    fn chunks(texts: &[&str]) -> Vec<Chunk> {
        texts
            .iter()
            .map(|text| Chunk {
                text: text.to_string(),
                start: 0,
                overlap: 0,
            })
            .collect()
    }

    fn settings() -> SummarySettings {
        SummarySettings {
            model: "anthropic.claude-v2".into(),
            max_tokens: 256,
        }
    }

    #[test]
    fn prompt_embeds_chunk_verbatim() {
        let prompt = build_chunk_prompt("Line one.\n  Line two.");
        assert!(prompt.starts_with("Please summarize the following text in 3-5 sentences"));
        assert!(prompt.contains("\n\nLine one.\n  Line two.\n\n"));
        assert!(prompt.ends_with("Summary:"));
    }

    #[tokio::test]
    async fn one_summary_per_chunk_in_order() {
        let client = ScriptedClient::new(None);
        let summaries = summarize_chunks(&client, &settings(), &chunks(&["a", "b", "c"]))
            .await
            .expect("summaries");
        assert_eq!(summaries, vec!["summary-0", "summary-1", "summary-2"]);
        assert_eq!(join_summaries(&summaries), "summary-0 summary-1 summary-2");

        let prompts = client.prompts.lock().unwrap();
        assert!(prompts[1].contains("\n\nb\n\n"));
    }

    #[tokio::test]
    async fn failing_chunk_aborts_remaining_calls() {
        let client = ScriptedClient::new(Some(1));
        let error = summarize_chunks(&client, &settings(), &chunks(&["a", "b", "c"]))
            .await
            .unwrap_err();
        assert!(matches!(error, PipelineError::Summarization { chunk: 1, .. }));
        assert!(error.to_string().contains("throttled"));
        assert_eq!(client.prompts.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn no_chunks_means_empty_summary() {
        let client = ScriptedClient::new(None);
        let summaries = summarize_chunks(&client, &settings(), &[])
            .await
            .expect("summaries");
        assert!(summaries.is_empty());
        assert_eq!(join_summaries(&summaries), "");
    }
}
