use serde::Serialize;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::stages::PageDescriptor;
use crate::types::{ModelId, Stage};

pub const JOURNAL_FILE: &str = "runs.jsonl";

/// One thing that happened during a run.
///
/// Serialized as `"step": "<variant>", "data": {...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "step", content = "data", rename_all = "snake_case")]
pub enum JournalEntry {
    AgentCall {
        model: Option<ModelId>,
        task_chars: usize,
        steps: usize,
        elapsed_ms: u64,
    },
    /// Discovery result, incomplete entries included
    Pages { pages: Vec<PageDescriptor> },
    Scenarios { pages: usize, generated: usize },
    FileWritten { path: PathBuf, bytes: usize },
}

#[derive(Serialize)]
struct JournalLine<'a> {
    ts: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    run_id: Option<&'a str>,
    stage: Stage,
    #[serde(flatten)]
    entry: &'a JournalEntry,
}

/// Append-only JSONL record of what a run asked the agent and wrote to disk.
pub struct RunJournal {
    path: PathBuf,
    run_id: Option<String>,
    file: Mutex<File>,
}

impl RunJournal {
    /// Open (or create) `<dir>/runs.jsonl` for appending.
    pub fn new(dir: PathBuf) -> io::Result<Self> {
        create_dir_all(&dir)?;
        let path = dir.join(JOURNAL_FILE);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            run_id: None,
            file: Mutex::new(file),
        })
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, stage: Stage, entry: &JournalEntry) -> io::Result<()> {
        let ts = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let line = JournalLine {
            ts,
            run_id: self.run_id.as_deref(),
            stage,
            entry,
        };

        let mut bytes = serde_json::to_vec(&line).map_err(io::Error::other)?;
        bytes.push(b'\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::other("journal mutex poisoned"))?;
        file.write_all(&bytes)?;
        file.flush()
    }
}
