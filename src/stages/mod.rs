//! The three pipeline stages, run through a shared [`Pipeline`].

mod codegen;
mod discovery;
mod scenario;

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Instant;

pub use codegen::CodegenReport;
pub use discovery::parse_site_structure;
pub use scenario::ScenarioReport;

use crate::agent::{AgentRun, BrowserAgent};
use crate::config::Settings;
use crate::errors::PipelineError;
use crate::journal::{JournalEntry, RunJournal};
use crate::types::Stage;

/// One page reported by structure discovery.
///
/// Fields the agent left out (or gave as non-strings) are `None`; such
/// entries are skipped by scenario generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageDescriptor {
    pub path: Option<String>,
    pub purpose: Option<String>,
}

impl PageDescriptor {
    pub fn new(path: impl Into<String>, purpose: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            purpose: Some(purpose.into()),
        }
    }

    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            path: field("path"),
            purpose: field("purpose"),
        }
    }

    /// `(path, purpose)` when both are present and non-empty.
    pub fn complete(&self) -> Option<(&str, &str)> {
        let path = self.path.as_deref().filter(|p| !p.is_empty())?;
        let purpose = self.purpose.as_deref().filter(|p| !p.is_empty())?;
        Some((path, purpose))
    }
}

pub struct Pipeline {
    settings: Settings,
    agent: Box<dyn BrowserAgent>,
    journal: Option<RunJournal>,
}

impl Pipeline {
    pub fn new(settings: Settings, agent: Box<dyn BrowserAgent>) -> Self {
        Self {
            settings,
            agent,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: RunJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// `scenario` mode: discovery followed by scenario generation.
    pub async fn run_scenario_mode(&self) -> Result<ScenarioReport, PipelineError> {
        let pages = self.discover().await?;
        self.generate_scenarios(&pages).await
    }

    async fn run_agent(&self, stage: Stage, task: &str) -> Result<AgentRun, PipelineError> {
        let llm = self.settings.llm_settings(stage);
        let started = Instant::now();
        let run = self.agent.run_task(task, &llm).await?;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        log::debug!("{stage} agent call took {elapsed_ms} ms ({} steps)", run.steps);
        self.record(
            stage,
            JournalEntry::AgentCall {
                model: llm.model,
                task_chars: task.chars().count(),
                steps: run.steps,
                elapsed_ms,
            },
        );
        Ok(run)
    }

    /// Journal failures never stop a run.
    fn record(&self, stage: Stage, entry: JournalEntry) {
        if let Some(journal) = &self.journal {
            if let Err(e) = journal.record(stage, &entry) {
                log::warn!("failed to write run journal: {e}");
            }
        }
    }

    fn record_file(&self, stage: Stage, path: &Path, bytes: usize) {
        self.record(
            stage,
            JournalEntry::FileWritten {
                path: path.to_path_buf(),
                bytes,
            },
        );
    }
}
