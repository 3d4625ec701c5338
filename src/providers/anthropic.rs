use serde_json::{Value, json};

use crate::errors::AgentError;
use crate::types::ModelId;

use super::{InferenceRequest, InferenceResponse, LLMProvider, ProviderHttpClient, Usage};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
// The messages API requires max_tokens on every request
const FALLBACK_MAX_TOKENS: u32 = 8192;

pub struct AnthropicProvider {
    http: ProviderHttpClient,
    key: String,
    default_model: ModelId,
}

impl AnthropicProvider {
    pub fn new(key: String, timeout_secs: u64) -> Result<Self, AgentError> {
        Ok(Self {
            http: ProviderHttpClient::new(timeout_secs)?,
            key,
            default_model: ModelId::claude_sonnet(),
        })
    }

    fn request_body(&self, req: &InferenceRequest) -> Value {
        let model = req.model.as_ref().unwrap_or(&self.default_model);
        let mut body = json!({
            "model": model.as_str(),
            "max_tokens": req.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            "system": req.system,
            "messages": [{ "role": "user", "content": req.prompt }],
        });
        if let Some(temp) = req.temperature {
            body["temperature"] = json!(temp);
        }
        body
    }
}

/// Concatenate the text blocks of a messages-API response.
pub(crate) fn parse_messages_response(
    response_json: &Value,
) -> Result<InferenceResponse, AgentError> {
    let content_arr = response_json["content"].as_array().ok_or_else(|| {
        AgentError::InvalidResponse("Unexpected API response: missing 'content' array".to_string())
    })?;

    let text = content_arr
        .iter()
        .filter(|block| block.get("type").and_then(|v| v.as_str()) == Some("text"))
        .filter_map(|block| block.get("text").and_then(|v| v.as_str()))
        .collect::<Vec<_>>()
        .join("");

    let stop_reason = response_json
        .get("stop_reason")
        .and_then(|v| v.as_str())
        .unwrap_or("end_turn")
        .to_string();

    let usage = response_json
        .get("usage")
        .map(|usage_obj| Usage {
            input_tokens: usage_obj
                .get("input_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            output_tokens: usage_obj
                .get("output_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
        })
        .unwrap_or_default();

    Ok(InferenceResponse {
        text,
        stop_reason,
        usage,
    })
}

#[async_trait::async_trait]
impl LLMProvider for AnthropicProvider {
    async fn infer(&self, req: &InferenceRequest) -> Result<InferenceResponse, AgentError> {
        let res = self
            .http
            .client()
            .post(MESSAGES_URL)
            .header("x-api-key", &self.key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&self.request_body(req))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await?;
            return Err(AgentError::ApiError(format!(
                "Anthropic API Error {status}: {err_text}"
            )));
        }

        let response_json: Value = res.json().await?;
        parse_messages_response(&response_json)
    }

    fn name(&self) -> &str {
        "anthropic"
    }

    fn default_model(&self) -> &ModelId {
        &self.default_model
    }

    fn validate_config(&self) -> Result<(), AgentError> {
        if self.key.is_empty() {
            return Err(AgentError::Config("Anthropic API key is empty".to_string()));
        }
        Ok(())
    }
}
