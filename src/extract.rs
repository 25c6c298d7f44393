//! Text extraction from stored objects.
//!
//! Plain-text objects pass through untouched. Every other format is sent to a document-analysis
//! service and rebuilt from its `LINE` blocks.

use async_trait::async_trait;
use aws_sdk_textract::{
    error::DisplayErrorContext,
    primitives::Blob,
    types::Document,
};
use thiserror::Error;

use crate::storage::RawContent;

/// Block type tag identifying a line of text.
pub const LINE_BLOCK: &str = "LINE";
const PLAIN_TEXT_EXTENSION: &str = ".txt";

/// Errors raised while extracting text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// A plain-text object was not valid UTF-8.
    #[error("Text object is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    /// The document-analysis service failed.
    #[error("Document analysis failed: {0}")]
    Analysis(String),
}

/// One block returned by document analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    /// Service type tag such as `PAGE`, `LINE`, or `WORD`.
    pub block_type: String,
    /// Recognized text, when the block carries any.
    pub text: Option<String>,
}

impl TextBlock {
    /// Convenience constructor for a `LINE` block.
    pub fn line(text: impl Into<String>) -> Self {
        Self {
            block_type: LINE_BLOCK.to_string(),
            text: Some(text.into()),
        }
    }
}

/// OCR / document-analysis collaborator.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    /// Detect text in a document, returning blocks in service order.
    async fn detect_text(&self, document: &[u8]) -> Result<Vec<TextBlock>, ExtractionError>;
}

/// Extract plain text from fetched content.
///
/// `.txt` objects (any case) are returned unchanged; other extensions are analyzed and the
/// text of their `LINE` blocks is joined with single spaces.
pub async fn extract_text(
    content: RawContent,
    analyzer: &dyn DocumentAnalyzer,
) -> Result<String, ExtractionError> {
    if content.extension.eq_ignore_ascii_case(PLAIN_TEXT_EXTENSION) {
        return String::from_utf8(content.bytes).map_err(|error| {
            tracing::error!(error = %error, "Plain-text object is not valid UTF-8");
            ExtractionError::from(error)
        });
    }

    tracing::debug!(
        extension = %content.extension,
        size = content.bytes.len(),
        "Analyzing document"
    );
    let blocks = analyzer.detect_text(&content.bytes).await.map_err(|error| {
        tracing::error!(extension = %content.extension, error = %error, "Error extracting text");
        error
    })?;
    Ok(join_lines(&blocks))
}

/// Join the text of `LINE` blocks in order, separated by single spaces.
pub fn join_lines(blocks: &[TextBlock]) -> String {
    blocks
        .iter()
        .filter(|block| block.block_type == LINE_BLOCK)
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// [`DocumentAnalyzer`] backed by Amazon Textract `DetectDocumentText`.
pub struct TextractAnalyzer {
    client: aws_sdk_textract::Client,
}

impl TextractAnalyzer {
    /// Build an analyzer from shared AWS settings.
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_textract::Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl DocumentAnalyzer for TextractAnalyzer {
    async fn detect_text(&self, document: &[u8]) -> Result<Vec<TextBlock>, ExtractionError> {
        let response = self
            .client
            .detect_document_text()
            .document(Document::builder().bytes(Blob::new(document)).build())
            .send()
            .await
            .map_err(|error| ExtractionError::Analysis(DisplayErrorContext(&error).to_string()))?;

        let blocks = response
            .blocks()
            .iter()
            .map(|block| TextBlock {
                block_type: block
                    .block_type()
                    .map(|kind| kind.as_str().to_string())
                    .unwrap_or_default(),
                text: block.text().map(str::to_string),
            })
            .collect::<Vec<_>>();
        tracing::debug!(blocks = blocks.len(), "Textract returned blocks");
        Ok(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubAnalyzer {
        result: Mutex<Option<Result<Vec<TextBlock>, ExtractionError>>>,
        calls: Mutex<usize>,
    }

    impl StubAnalyzer {
        fn new(result: Result<Vec<TextBlock>, ExtractionError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl DocumentAnalyzer for StubAnalyzer {
        async fn detect_text(&self, _document: &[u8]) -> Result<Vec<TextBlock>, ExtractionError> {
            *self.calls.lock().unwrap() += 1;
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("analyzer called once")
        }
    }

    fn block(kind: &str, text: &str) -> TextBlock {
        TextBlock {
            block_type: kind.to_string(),
            text: Some(text.to_string()),
        }
    }

    #[tokio::test]
    async fn plain_text_passes_through_unchanged() {
        let analyzer = StubAnalyzer::new(Ok(vec![]));
        let body = "  Hello world.\n\nSecond\tparagraph  ";
        let content = RawContent::for_key("notes/Report.TXT", body.as_bytes().to_vec());
        let text = extract_text(content, &analyzer).await.expect("text");
        assert_eq!(text, body);
        assert_eq!(analyzer.calls(), 0);
    }

    #[tokio::test]
    async fn other_formats_keep_only_line_blocks_in_order() {
        let analyzer = StubAnalyzer::new(Ok(vec![
            TextBlock {
                block_type: "PAGE".into(),
                text: None,
            },
            block("LINE", "First line"),
            block("WORD", "First"),
            block("LINE", "Second line"),
            block("WORD", "Second"),
        ]));
        let content = RawContent::for_key("scan.png", vec![0x89, 0x50, 0x4e, 0x47]);
        let text = extract_text(content, &analyzer).await.expect("text");
        assert_eq!(text, "First line Second line");
        assert_eq!(analyzer.calls(), 1);
    }

    #[tokio::test]
    async fn no_line_blocks_yields_empty_text() {
        let analyzer = StubAnalyzer::new(Ok(vec![block("WORD", "orphan")]));
        let content = RawContent::for_key("blank.pdf", b"%PDF".to_vec());
        let text = extract_text(content, &analyzer).await.expect("text");
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn analysis_failure_is_propagated() {
        let analyzer = StubAnalyzer::new(Err(ExtractionError::Analysis(
            "UnsupportedDocumentException".into(),
        )));
        let content = RawContent::for_key("deck.pptx", b"PK".to_vec());
        let error = extract_text(content, &analyzer).await.unwrap_err();
        assert!(error.to_string().contains("UnsupportedDocumentException"));
    }

    #[tokio::test]
    async fn invalid_utf8_text_is_an_extraction_error() {
        let analyzer = StubAnalyzer::new(Ok(vec![]));
        let content = RawContent::for_key("broken.txt", vec![0xff, 0xfe, 0x00]);
        let error = extract_text(content, &analyzer).await.unwrap_err();
        assert!(matches!(error, ExtractionError::InvalidUtf8(_)));
    }
}
