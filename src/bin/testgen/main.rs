use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use testgen::{ModelId, Pipeline, RunJournal, Settings, create_agent, sanitize, ui};

mod args;
use args::{CliArgs, Mode};

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    ui::init_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error(format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: CliArgs) -> Result<()> {
    let settings = Settings::from_env(args.config.as_deref(), args.model.map(ModelId::new))
        .context("failed to load configuration")?;
    if let Some(password) = &settings.target.password {
        sanitize::register_secret(password);
    }

    let agent = create_agent(&settings)
        .await
        .context("failed to set up the agent backend")?;
    ui::header(agent.name(), args.mode.as_str(), settings.target.url.as_deref());

    let journal = match &settings.journal_dir {
        Some(dir) => {
            let run_id = format!(
                "{}-{}",
                chrono::Local::now().format("%Y%m%d%H%M%S"),
                args.mode.as_str()
            );
            let journal = RunJournal::new(dir.clone())
                .with_context(|| format!("failed to open run journal in {}", dir.display()))?;
            Some(journal.with_run_id(run_id))
        }
        None => None,
    };

    let mut pipeline = Pipeline::new(settings, agent);
    if let Some(journal) = journal {
        pipeline = pipeline.with_journal(journal);
    }

    match args.mode {
        Mode::Scenario => {
            let report = pipeline.run_scenario_mode().await?;
            ui::summary(&format!(
                "{} of {} pages turned into scenarios -> {}",
                report.pages_used,
                report.pages_discovered,
                report.log_path.display()
            ));
        }
        Mode::Code => {
            let report = pipeline.generate_code().await?;
            if report.source_log.is_some() {
                ui::summary(&format!(
                    "{} test files written to {} ({} blocks skipped)",
                    report.written.len(),
                    pipeline.settings().test_dir.display(),
                    report.skipped
                ));
            }
        }
    }

    Ok(())
}
