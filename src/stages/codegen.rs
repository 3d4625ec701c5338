use std::path::PathBuf;

use super::Pipeline;
use crate::errors::PipelineError;
use crate::naming;
use crate::prompts;
use crate::storage;
use crate::types::Stage;
use crate::ui;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodegenReport {
    /// The scenario log that was read; `None` when there was none to read
    pub source_log: Option<PathBuf>,
    pub written: Vec<PathBuf>,
    /// Blocks whose first line named no path
    pub skipped: usize,
}

impl Pipeline {
    /// Generate one test file per block of the newest scenario log.
    ///
    /// A missing log is not an error. A failing agent call stops the loop;
    /// files written before it stay on disk.
    pub async fn generate_code(&self) -> Result<CodegenReport, PipelineError> {
        let Some(latest) = storage::latest_log(&self.settings.scenario_dir)? else {
            ui::warn(format!(
                "No log files found in {}.",
                self.settings.scenario_dir.display()
            ));
            return Ok(CodegenReport::default());
        };
        log::info!("reading scenarios from {}", latest.display());

        let content = storage::read_log(&latest)?;
        let mut report = CodegenReport {
            source_log: Some(latest),
            ..Default::default()
        };

        for block in storage::split_blocks(&content) {
            let Some(path) = naming::scenario_path(block) else {
                ui::skipped("Scenario block without a `path:` line, skipped");
                report.skipped += 1;
                continue;
            };
            let file_name = naming::test_file_name(&path);

            let task = prompts::test_code(&self.settings.target, block);
            ui::section_title(&format!("Test code for {path} -> {file_name}"));
            ui::task_preview(&task);

            let run = self.run_agent(Stage::Code, &task).await?;
            let code = run.extract_content();
            ui::info_full(&code);

            let written = storage::save_test_file(&self.settings.test_dir, &file_name, &code)?;
            ui::file_saved("Test file", &written);
            self.record_file(Stage::Code, &written, code.len());
            report.written.push(written);
        }

        Ok(report)
    }
}
