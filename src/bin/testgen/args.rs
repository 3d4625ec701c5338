use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Discover the site structure and generate test scenarios
    Scenario,
    /// Generate test code from the latest scenario log
    Code,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Scenario => "scenario",
            Mode::Code => "code",
        }
    }
}

/// Generate end-to-end tests for a website with a browser agent.
#[derive(Parser, Debug)]
#[command(name = "testgen")]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    /// Choose 'scenario' to create scenarios or 'code' to create test code
    #[arg(value_enum)]
    pub mode: Mode,

    /// Model for every stage (overrides MODEL and the config file)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Config file (default: .testgen/config.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
