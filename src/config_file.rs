use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;
use crate::types::Stage;

pub const DEFAULT_CONFIG_PATH: &str = ".testgen/config.json";

/// Model settings for one stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    /// Model name/ID (the MODEL env var and --model still win over this)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Output token cap for the agent's language model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Config file schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Settings applied to every stage before the per-stage overlay
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<StageSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discovery: Option<StageSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario: Option<StageSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<StageSettings>,

    /// HTTP timeout for LLM backends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl StageConfig {
    /// Load config from `.testgen/config.json`; a missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn stage_settings(&self, stage: Stage) -> Option<&StageSettings> {
        match stage {
            Stage::Discovery => self.discovery.as_ref(),
            Stage::Scenario => self.scenario.as_ref(),
            Stage::Code => self.code.as_ref(),
        }
    }

    /// Merge stage-specific settings over defaults
    pub fn merged_settings(&self, stage: Stage) -> StageSettings {
        let mut merged = self.defaults.clone().unwrap_or_default();

        if let Some(stage_settings) = self.stage_settings(stage) {
            if let Some(model) = &stage_settings.model {
                merged.model = Some(model.clone());
            }
            if let Some(temperature) = stage_settings.temperature {
                merged.temperature = Some(temperature);
            }
            if let Some(max_tokens) = stage_settings.max_tokens {
                merged.max_tokens = Some(max_tokens);
            }
        }

        merged
    }
}
