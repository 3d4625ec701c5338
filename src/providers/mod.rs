use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

pub mod anthropic;
pub mod local;
pub mod openai;

use crate::errors::AgentError;
use crate::types::ModelId;
use reqwest::Client;

pub(crate) struct ProviderHttpClient {
    client: Client,
}

impl ProviderHttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, AgentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Request structure for a single-shot completion
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// `None` lets the provider pick its default model
    pub model: Option<ModelId>,
    pub system: String,
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Response structure from LLM inference
#[derive(Debug, Clone)]
pub struct InferenceResponse {
    pub text: String,
    pub stop_reason: String,
    pub usage: Usage,
}

/// Token usage information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Trait for LLM providers
#[async_trait::async_trait]
pub trait LLMProvider: Send + Sync {
    /// Run inference with the given request
    async fn infer(&self, req: &InferenceRequest) -> Result<InferenceResponse, AgentError>;

    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Model used when a request does not name one
    fn default_model(&self) -> &ModelId;

    /// Validate that this provider is properly configured
    fn validate_config(&self) -> Result<(), AgentError>;
}

/// Create a provider based on configuration priority:
/// 1. Explicit PROVIDER env var
/// 2. Auto-detection from available API keys (OpenAI first, then Anthropic)
/// 3. Try local Ollama
/// 4. Error if none found
pub async fn create_provider(timeout_secs: u64) -> Result<Box<dyn LLMProvider>, AgentError> {
    if let Ok(provider_name) = env::var("PROVIDER") {
        return create_provider_by_name(&provider_name, timeout_secs);
    }

    if let Ok(key) = env::var("OPENAI_API_KEY") {
        return Ok(Box::new(openai::OpenAIProvider::new(key, timeout_secs)?));
    }

    if let Ok(key) = env::var("ANTHROPIC_API_KEY") {
        return Ok(Box::new(anthropic::AnthropicProvider::new(
            key,
            timeout_secs,
        )?));
    }

    if local::LocalProvider::is_available().await {
        return Ok(Box::new(local::LocalProvider::from_env(timeout_secs)?));
    }

    Err(AgentError::NoBackendConfigured)
}

/// Create a provider by explicit name
pub fn create_provider_by_name(
    name: &str,
    timeout_secs: u64,
) -> Result<Box<dyn LLMProvider>, AgentError> {
    match name.to_lowercase().as_str() {
        "openai" => {
            let key = env::var("OPENAI_API_KEY")
                .map_err(|_| AgentError::MissingApiKey("openai".to_string()))?;
            Ok(Box::new(openai::OpenAIProvider::new(key, timeout_secs)?))
        }
        "anthropic" => {
            let key = env::var("ANTHROPIC_API_KEY")
                .map_err(|_| AgentError::MissingApiKey("anthropic".to_string()))?;
            Ok(Box::new(anthropic::AnthropicProvider::new(
                key,
                timeout_secs,
            )?))
        }
        "local" | "ollama" => Ok(Box::new(local::LocalProvider::from_env(timeout_secs)?)),
        other => Err(AgentError::Config(format!("Unknown provider: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_provider_name_is_config_error() {
        let err = create_provider_by_name("openrouter", 5)
            .err()
            .expect("unknown provider should fail");
        assert!(matches!(err, AgentError::Config(_)));
        assert!(err.to_string().contains("openrouter"));
    }
}
