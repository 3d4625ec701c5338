use std::path::PathBuf;

use super::{PageDescriptor, Pipeline};
use crate::errors::PipelineError;
use crate::journal::JournalEntry;
use crate::prompts;
use crate::storage;
use crate::types::Stage;
use crate::ui;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub log_path: PathBuf,
    /// Entries returned by discovery, complete or not
    pub pages_discovered: usize,
    /// Pages that got an agent call
    pub pages_used: usize,
}

impl Pipeline {
    /// Generate scenarios for each complete page and save them as one log.
    ///
    /// Nothing is written unless every agent call succeeds.
    pub async fn generate_scenarios(
        &self,
        pages: &[PageDescriptor],
    ) -> Result<ScenarioReport, PipelineError> {
        let mut all_scenarios = Vec::new();

        for page in pages {
            let Some((path, purpose)) = page.complete() else {
                log::debug!("skipping incomplete page entry: {page:?}");
                continue;
            };

            ui::section_title(&format!("Scenarios for {path}"));
            let task = prompts::scenarios(
                &self.settings.target,
                path,
                purpose,
                &self.settings.scenario_language,
            );
            let run = self.run_agent(Stage::Scenario, &task).await?;
            all_scenarios.push(run.extract_content());
        }

        let final_output = storage::join_blocks(&all_scenarios);
        ui::info_full(&final_output);

        let log_path = storage::save_scenario_log(&self.settings.scenario_dir, &final_output)?;
        ui::file_saved("Scenario log", &log_path);
        self.record_file(Stage::Scenario, &log_path, final_output.len());
        self.record(
            Stage::Scenario,
            JournalEntry::Scenarios {
                pages: pages.len(),
                generated: all_scenarios.len(),
            },
        );

        Ok(ScenarioReport {
            log_path,
            pages_discovered: pages.len(),
            pages_used: all_scenarios.len(),
        })
    }
}
