use serde_json::Value;

use super::{PageDescriptor, Pipeline};
use crate::agent::AgentRun;
use crate::errors::PipelineError;
use crate::journal::JournalEntry;
use crate::prompts;
use crate::types::Stage;
use crate::ui;

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// The text to parse as the site structure.
///
/// A structured (non-string) answer is rendered back to JSON text.
pub(crate) fn structure_text(run: &AgentRun) -> String {
    match run.final_result() {
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            log::warn!("site structure answer is not a string, converting to string");
            other.to_string()
        }
        None => run.extract_content(),
    }
}

/// Parse the agent's reply into page descriptors.
///
/// Entries are kept even when incomplete; scenario generation filters them.
pub fn parse_site_structure(text: &str) -> Result<Vec<PageDescriptor>, PipelineError> {
    let value: Value = serde_json::from_str(text).map_err(PipelineError::Discovery)?;
    match value {
        Value::Array(items) => Ok(items.iter().map(PageDescriptor::from_value).collect()),
        other => Err(PipelineError::DiscoveryShape(json_kind(&other))),
    }
}

impl Pipeline {
    /// Ask the agent for the site's pages.
    pub async fn discover(&self) -> Result<Vec<PageDescriptor>, PipelineError> {
        ui::section_title("Discovering site structure");
        let task = prompts::site_structure(&self.settings.target);
        let run = self.run_agent(Stage::Discovery, &task).await?;

        let pages = parse_site_structure(&structure_text(&run))?;
        log::info!("discovered {} page entries", pages.len());
        self.record(
            Stage::Discovery,
            JournalEntry::Pages {
                pages: pages.clone(),
            },
        );
        Ok(pages)
    }
}
