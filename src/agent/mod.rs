//! The external browser agent.
//!
//! Crawling, DOM interaction and model reasoning all happen behind
//! [`BrowserAgent`]; the pipeline only hands it a task string and reads the
//! final answer back out of the returned [`AgentRun`].

mod command;
mod llm;
mod mock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use command::CommandAgent;
pub use llm::LlmAgent;
pub use mock::{AgentCall, MockAgent};

use crate::config::Settings;
use crate::errors::AgentError;
use crate::providers;
use crate::types::ModelId;

/// Language-model backend settings for one agent run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmSettings {
    /// `None` leaves the choice to the backend
    pub model: Option<ModelId>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Result of running one task to completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    /// The agent's final answer. Absent when the run ended without one.
    #[serde(default)]
    pub final_result: Option<Value>,
    #[serde(default)]
    pub steps: usize,
}

impl AgentRun {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            final_result: Some(Value::String(text.into())),
            steps: 1,
        }
    }

    /// A run that produced no answer at all.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn final_result(&self) -> Option<&Value> {
        self.final_result.as_ref()
    }

    /// The final answer as text; anything other than a string answer is `""`.
    pub fn extract_content(&self) -> String {
        match &self.final_result {
            Some(Value::String(text)) => text.clone(),
            _ => String::new(),
        }
    }
}

#[async_trait::async_trait]
pub trait BrowserAgent: Send + Sync {
    /// Run `task` to completion and return the result.
    async fn run_task(&self, task: &str, llm: &LlmSettings) -> Result<AgentRun, AgentError>;

    /// Backend name for display.
    fn name(&self) -> &str;
}

/// Pick the agent backend: a configured `AGENT_COMMAND` wins, otherwise a
/// plain LLM provider is used.
pub async fn create_agent(settings: &Settings) -> Result<Box<dyn BrowserAgent>, AgentError> {
    if let Some(command) = &settings.agent_command {
        let agent = CommandAgent::new(command.clone());
        log::info!(
            "using command agent: {command} (default model {})",
            agent.default_model()
        );
        return Ok(Box::new(agent));
    }

    let provider = providers::create_provider(settings.timeout_secs).await?;
    provider.validate_config()?;
    log::info!(
        "using {} provider (default model {})",
        provider.name(),
        provider.default_model()
    );
    Ok(Box::new(LlmAgent::new(provider)))
}
