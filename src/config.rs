use std::env;
use thiserror::Error;

/// Default maximum chunk length, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 4000;
/// Default overlap between consecutive chunks, in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
/// Default model used for chunk summaries.
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "anthropic.claude-v2";
/// Default generation budget per chunk summary.
pub const DEFAULT_SUMMARIZATION_MAX_TOKENS: u32 = 256;
const DEFAULT_OPENSEARCH_PORT: u16 = 443;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarization pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region used by S3, Textract, Bedrock, and request signing.
    pub aws_region: String,
    /// Host name of the OpenSearch domain.
    pub opensearch_endpoint: String,
    /// Port of the OpenSearch domain.
    pub opensearch_port: u16,
    /// Index receiving summary documents.
    pub opensearch_index: String,
    /// Backend used to generate chunk summaries.
    pub summarization_provider: SummarizationProvider,
    /// Model identifier passed to the summarization backend.
    pub summarization_model: String,
    /// Generation budget per chunk summary.
    pub summarization_max_tokens: u32,
    /// Optional Ollama base URL when the Ollama provider is selected.
    pub ollama_url: Option<String>,
    /// Maximum chunk length in characters.
    pub text_splitter_chunk_size: usize,
    /// Overlap between consecutive chunks in characters.
    pub text_splitter_chunk_overlap: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SummarizationProvider {
    /// Amazon Bedrock runtime.
    #[default]
    Bedrock,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, performing validation along the way.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let chunk_size = vars
            .parsed("TEXT_SPLITTER_CHUNK_SIZE")?
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        let chunk_overlap = vars
            .parsed("TEXT_SPLITTER_CHUNK_OVERLAP")?
            .unwrap_or(DEFAULT_CHUNK_OVERLAP);
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidValue(
                "TEXT_SPLITTER_CHUNK_OVERLAP".to_string(),
            ));
        }

        Ok(Self {
            aws_region: vars.required("AWS_REGION")?,
            opensearch_endpoint: vars.required("OPENSEARCH_ENDPOINT")?,
            opensearch_port: vars
                .parsed("OPENSEARCH_PORT")?
                .unwrap_or(DEFAULT_OPENSEARCH_PORT),
            opensearch_index: vars.required("OPENSEARCH_INDEX")?,
            summarization_provider: vars
                .optional("SUMMARIZATION_PROVIDER")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".to_string())
                    })
                })
                .transpose()?
                .unwrap_or_default(),
            summarization_model: vars
                .optional("SUMMARIZATION_MODEL")
                .unwrap_or_else(|| DEFAULT_SUMMARIZATION_MODEL.to_string()),
            summarization_max_tokens: vars
                .parsed("SUMMARIZATION_MAX_TOKENS")?
                .unwrap_or(DEFAULT_SUMMARIZATION_MAX_TOKENS),
            ollama_url: vars.optional("OLLAMA_URL"),
            text_splitter_chunk_size: chunk_size,
            text_splitter_chunk_overlap: chunk_overlap,
            server_port: vars.parsed("SERVER_PORT")?,
        })
    }

    /// Base URL of the OpenSearch domain.
    ///
    /// Bare host names are addressed over HTTPS on the configured port; endpoints that already
    /// carry a scheme are used as given.
    pub fn opensearch_url(&self) -> String {
        let endpoint = self.opensearch_endpoint.trim().trim_end_matches('/');
        if endpoint.contains("://") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}:{}", self.opensearch_port)
        }
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
    }

    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bedrock" => Ok(Self::Bedrock),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Load configuration from `.env` (when present) and the process environment.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        region = %config.aws_region,
        opensearch = %config.opensearch_url(),
        index = %config.opensearch_index,
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        chunk_size = config.text_splitter_chunk_size,
        chunk_overlap = config.text_splitter_chunk_overlap,
        "Loaded configuration"
    );
    Ok(config)
}
