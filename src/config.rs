use std::env;
use std::path::{Path, PathBuf};

use crate::agent::LlmSettings;
use crate::config_file::StageConfig;
use crate::errors::ConfigError;
use crate::types::{ModelId, Stage};

pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const SCENARIO_MAX_TOKENS: u32 = 5000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SCENARIO_DIR: &str = "./scenario";
pub const DEFAULT_TEST_DIR: &str = "./tests";

/// The site under test and the login the agent should use.
///
/// Values are kept as given; an unset variable stays `None` and is rendered
/// into prompts as a placeholder rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Target {
    pub url: Option<String>,
    pub user_id: Option<String>,
    pub password: Option<String>,
}

/// Everything a stage needs, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub target: Target,
    pub scenario_language: Option<String>,
    pub scenario_dir: PathBuf,
    pub test_dir: PathBuf,
    pub journal_dir: Option<PathBuf>,
    pub agent_command: Option<String>,
    pub timeout_secs: u64,
    pub stages: StageConfig,
    /// CLI `--model`, else the MODEL env var
    pub model_override: Option<ModelId>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target: Target::default(),
            scenario_language: None,
            scenario_dir: PathBuf::from(DEFAULT_SCENARIO_DIR),
            test_dir: PathBuf::from(DEFAULT_TEST_DIR),
            journal_dir: None,
            agent_command: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            stages: StageConfig::default(),
            model_override: None,
        }
    }
}

impl Settings {
    /// Load `.env`, the process environment and the config file.
    pub fn from_env(
        config_path: Option<&Path>,
        cli_model: Option<ModelId>,
    ) -> Result<Self, ConfigError> {
        // A missing .env is fine
        let _ = dotenvy::dotenv();

        let stages = match config_path {
            Some(path) => StageConfig::load_from(path)?,
            None => StageConfig::load()?,
        };

        let target = Target {
            url: env::var("URL").ok(),
            user_id: env::var("USER_ID").ok(),
            password: env::var("PASSWORD").ok(),
        };

        let model_override = cli_model.or_else(|| non_empty_var("MODEL").map(ModelId::new));
        let timeout_secs = stages.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            target,
            scenario_language: env::var("SCENARIO_LANGUAGE").ok(),
            scenario_dir: non_empty_var("SCENARIO_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCENARIO_DIR)),
            test_dir: non_empty_var("TEST_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_TEST_DIR)),
            journal_dir: non_empty_var("TESTGEN_JOURNAL_DIR").map(PathBuf::from),
            agent_command: non_empty_var("AGENT_COMMAND"),
            timeout_secs,
            stages,
            model_override,
        })
    }

    /// Resolve the language-model settings for a stage.
    ///
    /// Model precedence: override, then the stage entry, then the file
    /// defaults, then the backend's own default (`None`).
    pub fn llm_settings(&self, stage: Stage) -> LlmSettings {
        let file = self.stages.merged_settings(stage);
        let builtin_max_tokens = match stage {
            Stage::Scenario => Some(SCENARIO_MAX_TOKENS),
            Stage::Discovery | Stage::Code => None,
        };

        LlmSettings {
            model: self
                .model_override
                .clone()
                .or_else(|| file.model.map(ModelId::new)),
            temperature: Some(file.temperature.unwrap_or(DEFAULT_TEMPERATURE)),
            max_tokens: file.max_tokens.or(builtin_max_tokens),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
