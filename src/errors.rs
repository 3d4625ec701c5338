use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Missing API key for {0}")]
    MissingApiKey(String),

    #[error(
        "No agent backend configured. Set AGENT_COMMAND, OPENAI_API_KEY or ANTHROPIC_API_KEY, or start Ollama"
    )]
    NoBackendConfigured,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Agent command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Site structure reply is not valid JSON: {0}")]
    Discovery(#[source] serde_json::Error),

    #[error("Site structure reply must be a JSON array, got {0}")]
    DiscoveryShape(&'static str),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid log file pattern: {0}")]
    Glob(#[from] glob::PatternError),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
