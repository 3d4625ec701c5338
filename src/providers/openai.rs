use serde_json::{Value, json};

use crate::errors::AgentError;
use crate::types::ModelId;

use super::{InferenceRequest, InferenceResponse, LLMProvider, ProviderHttpClient, Usage};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAIProvider {
    http: ProviderHttpClient,
    key: String,
    default_model: ModelId,
}

impl OpenAIProvider {
    pub fn new(key: String, timeout_secs: u64) -> Result<Self, AgentError> {
        Ok(Self {
            http: ProviderHttpClient::new(timeout_secs)?,
            key,
            default_model: ModelId::gpt_4o(),
        })
    }

    fn request_body(&self, req: &InferenceRequest) -> Value {
        let model = req.model.as_ref().unwrap_or(&self.default_model);
        let mut body = json!({
            "model": model.as_str(),
            "messages": [
                { "role": "system", "content": req.system },
                { "role": "user", "content": req.prompt },
            ],
        });
        if let Some(temp) = req.temperature {
            body["temperature"] = json!(temp);
        }
        if let Some(max_tokens) = req.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

/// Pull the assistant text, finish reason and usage out of a chat completion.
pub(crate) fn parse_chat_completion(response_json: &Value) -> Result<InferenceResponse, AgentError> {
    let choice = response_json
        .get("choices")
        .and_then(|arr| arr.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| AgentError::InvalidResponse("No choices in response".to_string()))?;

    let message = choice
        .get("message")
        .ok_or_else(|| AgentError::InvalidResponse("No message in choice".to_string()))?;

    // A null content (refusal, tool-only turn) is an empty answer
    let text = message
        .get("content")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let stop_reason = choice
        .get("finish_reason")
        .and_then(|v| v.as_str())
        .unwrap_or("stop")
        .to_string();

    let usage = response_json
        .get("usage")
        .map(|usage_obj| Usage {
            input_tokens: usage_obj
                .get("prompt_tokens")
                .and_then(|v| v.as_u64())
                .unwrap_or(0) as u32,
            output_tokens: usage_obj
                .get("completion_tokens")
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
impl LLMProvider for OpenAIProvider {
    async fn infer(&self, req: &InferenceRequest) -> Result<InferenceResponse, AgentError> {
        let res = self
            .http
            .client()
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(req))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let err_text = res.text().await?;
            return Err(AgentError::ApiError(format!(
                "OpenAI API Error {status}: {err_text}"
            )));
        }

        let response_json: Value = res.json().await?;
        parse_chat_completion(&response_json)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &ModelId {
        &self.default_model
    }

    fn validate_config(&self) -> Result<(), AgentError> {
        if self.key.is_empty() {
            return Err(AgentError::MissingApiKey("openai".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(model: Option<&str>, max_tokens: Option<u32>) -> InferenceRequest {
        InferenceRequest {
            model: model.map(ModelId::new),
            system: "sys".to_string(),
            prompt: "list pages".to_string(),
            max_tokens,
            temperature: Some(0.8),
        }
    }

    #[test]
    fn body_uses_default_model_and_omits_unset_cap() {
        let provider = OpenAIProvider::new("k".to_string(), 5).unwrap();
        let body = provider.request_body(&request(None, None));

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][1]["content"], "list pages");
        assert!(body.get("max_tokens").is_none());
        assert!((body["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn body_carries_explicit_model_and_cap() {
        let provider = OpenAIProvider::new("k".to_string(), 5).unwrap();
        let body = provider.request_body(&request(Some("gpt-4o-mini"), Some(5000)));

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["max_tokens"], 5000);
    }

    #[test]
    fn parses_text_and_usage() {
        let response = json!({
            "choices": [{
                "message": { "role": "assistant", "content": "[{\"path\":\"/\"}]" },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 7 }
        });

        let parsed = parse_chat_completion(&response).unwrap();
        assert_eq!(parsed.text, "[{\"path\":\"/\"}]");
        assert_eq!(parsed.stop_reason, "stop");
        assert_eq!(parsed.usage.input_tokens, 12);
        assert_eq!(parsed.usage.output_tokens, 7);
    }

    #[test]
    fn null_content_is_empty_text() {
        let response = json!({
            "choices": [{ "message": { "content": null }, "finish_reason": "content_filter" }]
        });
        let parsed = parse_chat_completion(&response).unwrap();
        assert_eq!(parsed.text, "");
        assert_eq!(parsed.stop_reason, "content_filter");
    }

    #[test]
    fn missing_choices_is_invalid_response() {
        let err = parse_chat_completion(&json!({ "error": "nope" })).unwrap_err();
        assert!(matches!(err, AgentError::InvalidResponse(_)));
    }

    #[test]
    fn empty_key_fails_validation() {
        let provider = OpenAIProvider::new(String::new(), 5).unwrap();
        assert!(provider.validate_config().is_err());
    }
}
