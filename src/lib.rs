pub mod agent;
pub mod config;
pub mod config_file;
pub mod errors;
pub mod journal;
pub mod naming;
pub mod prompts;
pub mod providers;
pub mod sanitize;
pub mod stages;
pub mod storage;
pub mod types;
pub mod ui;

pub use crate::agent::{AgentRun, BrowserAgent, LlmSettings, MockAgent, create_agent};
pub use crate::config::{Settings, Target};
pub use crate::config_file::{StageConfig, StageSettings};
pub use crate::errors::{AgentError, ConfigError, PipelineError};
pub use crate::journal::{JournalEntry, RunJournal};
pub use crate::stages::{CodegenReport, PageDescriptor, Pipeline, ScenarioReport};
pub use crate::types::{ModelId, Stage};
