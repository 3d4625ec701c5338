use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{AgentRun, BrowserAgent, LlmSettings};
use crate::errors::AgentError;

#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    pub task: String,
    pub llm: LlmSettings,
}

/// Test double that records tasks and replays queued results.
///
/// Once the queue is exhausted every call returns [`AgentRun::empty`].
#[derive(Clone, Default)]
pub struct MockAgent {
    calls: Arc<Mutex<Vec<AgentCall>>>,
    results: Arc<Mutex<VecDeque<Result<AgentRun, AgentError>>>>,
}

impl MockAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: Result<AgentRun, AgentError>) {
        self.results
            .lock()
            .expect("mock agent results poisoned")
            .push_back(result);
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.push_result(Ok(AgentRun::from_text(text)));
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls.lock().expect("mock agent calls poisoned").clone()
    }
}

#[async_trait::async_trait]
impl BrowserAgent for MockAgent {
    async fn run_task(&self, task: &str, llm: &LlmSettings) -> Result<AgentRun, AgentError> {
        self.calls
            .lock()
            .expect("mock agent calls poisoned")
            .push(AgentCall {
                task: task.to_string(),
                llm: llm.clone(),
            });

        self.results
            .lock()
            .expect("mock agent results poisoned")
            .pop_front()
            .unwrap_or_else(|| Ok(AgentRun::empty()))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
