use serde_json::Value;

use super::{AgentRun, BrowserAgent, LlmSettings};
use crate::errors::AgentError;
use crate::providers::{InferenceRequest, LLMProvider};

const SYSTEM_PROMPT: &str = "You are a web QA automation agent. Follow the task exactly and \
answer only in the output format it asks for.";

/// Agent backed directly by a language model, without a browser.
///
/// Useful when no browser-driving agent is installed: the model answers from
/// the task text alone.
pub struct LlmAgent {
    provider: Box<dyn LLMProvider>,
}

impl LlmAgent {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl BrowserAgent for LlmAgent {
    async fn run_task(&self, task: &str, llm: &LlmSettings) -> Result<AgentRun, AgentError> {
        let req = InferenceRequest {
            model: llm.model.clone(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: task.to_string(),
            max_tokens: llm.max_tokens,
            temperature: llm.temperature,
        };

        let response = self.provider.infer(&req).await?;
        log::debug!(
            "{} finished ({}): {} in / {} out tokens",
            self.provider.name(),
            response.stop_reason,
            response.usage.input_tokens,
            response.usage.output_tokens
        );

        Ok(AgentRun {
            final_result: Some(Value::String(response.text)),
            steps: 1,
        })
    }

    fn name(&self) -> &str {
        self.provider.name()
    }
}
