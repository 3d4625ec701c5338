use serde_json::{Value, json};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{AgentRun, BrowserAgent, LlmSettings};
use crate::errors::AgentError;
use crate::types::ModelId;

const STDERR_TAIL_CHARS: usize = 2000;

/// Agent that runs an external program, e.g. a browser-use bridge script.
///
/// The command is run through `sh -c`. It receives
/// `{"task": ..., "llm": {"model", "temperature", "max_tokens"}}` on stdin and
/// must print either a JSON object `{"final_result": ..., "steps": n}` or the
/// plain-text answer on stdout. When no model is configured the bridge is
/// told to use `gpt-4o`.
pub struct CommandAgent {
    command: String,
    default_model: ModelId,
}

impl CommandAgent {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            default_model: ModelId::gpt_4o(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn default_model(&self) -> &ModelId {
        &self.default_model
    }

    fn payload(&self, task: &str, llm: &LlmSettings) -> Value {
        let model = llm.model.as_ref().unwrap_or(&self.default_model);
        json!({
            "task": task,
            "llm": {
                "model": model,
                "temperature": llm.temperature,
                "max_tokens": llm.max_tokens,
            },
        })
    }
}

/// Interpret the agent's stdout.
///
/// Only a JSON object carrying a `final_result` key is a result object; any
/// other output, JSON or not, is the plain-text answer.
pub(crate) fn parse_stdout(stdout: &str) -> Result<AgentRun, AgentError> {
    let trimmed = stdout.trim();
    if trimmed.starts_with('{') {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
            if map.contains_key("final_result") {
                return serde_json::from_value(Value::Object(map)).map_err(|e| {
                    AgentError::InvalidResponse(format!("agent printed a malformed result: {e}"))
                });
            }
        }
    }
    Ok(AgentRun::from_text(stdout.trim_end_matches(['\r', '\n'])))
}

fn tail(s: &str, max_chars: usize) -> String {
    let count = s.chars().count();
    if count <= max_chars {
        return s.to_string();
    }
    s.chars().skip(count - max_chars).collect()
}

#[async_trait::async_trait]
impl BrowserAgent for CommandAgent {
    async fn run_task(&self, task: &str, llm: &LlmSettings) -> Result<AgentRun, AgentError> {
        let payload = serde_json::to_vec(&self.payload(task, llm))?;

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // The agent may exit without reading its input
            match stdin.write_all(&payload).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e.into()),
            }
        }

        let output = child.wait_with_output().await?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            log::debug!("agent stderr:\n{stderr}");
        }

        if !output.status.success() {
            return Err(AgentError::CommandFailed(format!(
                "exit code {}: {}",
                output.status.code().unwrap_or(-1),
                tail(stderr.trim(), STDERR_TAIL_CHARS)
            )));
        }

        parse_stdout(&String::from_utf8_lossy(&output.stdout))
    }

    fn name(&self) -> &str {
        "command"
    }
}
