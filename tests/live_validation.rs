use std::env;

use docsum::{
    aws::load_sdk_config,
    config::Config,
    event::Notification,
    processing::SummaryPipeline,
    summarization::{BedrockSummarizationClient, SummarizationClient, SummarizationRequest},
};

fn live_config() -> Config {
    dotenvy::dotenv().ok();
    Config::from_env().expect("live tests need AWS_REGION, OPENSEARCH_ENDPOINT, OPENSEARCH_INDEX")
}

#[tokio::test]
#[ignore = "Requires Bedrock model access"]
async fn live_bedrock_summary_roundtrip() {
    let config = live_config();
    let sdk_config = load_sdk_config(&config).await;
    let client = BedrockSummarizationClient::new(&sdk_config);
    let summary = client
        .generate_summary(SummarizationRequest {
            model: config.summarization_model.clone(),
            prompt: docsum::processing::summarize::build_chunk_prompt(
                "Rust is a systems programming language focused on safety and speed.",
            ),
            max_tokens: config.summarization_max_tokens,
        })
        .await
        .expect("failed to request summary from Bedrock");
    assert!(!summary.is_empty(), "expected a non-empty summary");
}

#[tokio::test]
#[ignore = "Requires S3, Textract, Bedrock, and OpenSearch"]
async fn live_pipeline_processes_existing_object() {
    let config = live_config();
    let bucket = env::var("DOCSUM_LIVE_BUCKET").expect("DOCSUM_LIVE_BUCKET");
    let key = env::var("DOCSUM_LIVE_KEY").expect("DOCSUM_LIVE_KEY");

    let pipeline = SummaryPipeline::from_config(&config)
        .await
        .expect("pipeline clients");
    let notification = Notification::new(bucket, key.clone()).expect("notification");
    let outcome = pipeline
        .process(&notification)
        .await
        .expect("pipeline run");
    assert_eq!(outcome.doc_id, key);
    assert!(outcome.chunk_count >= 1 || outcome.extracted_chars == 0);
}
