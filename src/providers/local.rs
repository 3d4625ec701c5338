use serde_json::{Value, json};
use std::time::Duration;

use crate::errors::AgentError;
use crate::types::ModelId;

use super::{InferenceRequest, InferenceResponse, LLMProvider, ProviderHttpClient, Usage};

const DEFAULT_OLLAMA_HOST: &str = "http://localhost:11434";

pub struct LocalProvider {
    http: ProviderHttpClient,
    host: String,
    default_model: ModelId,
}

impl LocalProvider {
    /// Build from OLLAMA_HOST and OLLAMA_MODEL (falling back to MODEL).
    pub fn from_env(timeout_secs: u64) -> Result<Self, AgentError> {
        let host = ollama_host();
        let model = std::env::var("OLLAMA_MODEL")
            .ok()
            .or_else(|| std::env::var("MODEL").ok())
            .map(ModelId::new)
            .ok_or_else(|| {
                AgentError::Config(
                    "No local model configured. Set OLLAMA_MODEL or MODEL".to_string(),
                )
            })?;
        Self::new(host, model, timeout_secs)
    }

    pub fn new(host: String, default_model: ModelId, timeout_secs: u64) -> Result<Self, AgentError> {
        Ok(Self {
            http: ProviderHttpClient::new(timeout_secs)?,
            host,
            default_model,
        })
    }

    pub async fn is_available() -> bool {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
        {
            Ok(c) => c,
            Err(_) => return false,
        };

        match client.get(format!("{}/api/tags", ollama_host())).send().await {
            Ok(res) => res.status().is_success(),
            Err(_) => false,
        }
    }

    fn request_body(&self, req: &InferenceRequest) -> Value {
        let model = req.model.as_ref().unwrap_or(&self.default_model);
        let mut body = json!({
            "model": model.as_str(),
            "messages": [
                { "role": "system", "content": req.system },
                { "role": "user", "content": req.prompt },
            ],
            "stream": false,
        });

        let mut options = serde_json::Map::new();
        if let Some(temp) = req.temperature {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = req.max_tokens {
            options.insert("num_predict".to_string(), json!(max_tokens));
        }
        if !options.is_empty() {
            body["options"] = Value::Object(options);
        }
        body
    }
}

fn ollama_host() -> String {
    std::env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string())
}

pub(crate) fn parse_chat_response(response_json: &Value) -> Result<InferenceResponse, AgentError> {
    let text = response_json
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| AgentError::InvalidResponse("No message content in response".to_string()))?
        .to_string();

    let usage = Usage {
        input_tokens: response_json
            .get("prompt_eval_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
        output_tokens: response_json
            .get("eval_count")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as u32,
    };

    let stop_reason = response_json
        .get("done_reason")
        .and_then(|v| v.as_str())
        .unwrap_or("stop")
        .to_string();

    Ok(InferenceResponse {
        text,
        stop_reason,
        usage,
    })
}

#[async_trait::async_trait]
impl LLMProvider for LocalProvider {
    async fn infer(&self, req: &InferenceRequest) -> Result<InferenceResponse, AgentError> {
        let res = self
            .http
            .client()
            .post(format!("{}/api/chat", self.host))
            .header("Content-Type", "application/json")
            .json(&self.request_body(req))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await?;
            return Err(AgentError::ApiError(format!(
                "Ollama API Error {status}: {err_text}"
            )));
        }

        let response_json: Value = res.json().await?;
        parse_chat_response(&response_json)
    }

    fn name(&self) -> &str {
        "local"
    }

    fn default_model(&self) -> &ModelId {
        &self.default_model
    }

    fn validate_config(&self) -> Result<(), AgentError> {
        if self.host.is_empty() {
            return Err(AgentError::Config("Ollama host is empty".to_string()));
        }
        Ok(())
    }
}
