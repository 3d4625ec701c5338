//! On-disk hand-off between stages: scenario logs in, test files out.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::errors::PipelineError;

/// Separator between scenario blocks inside a log file.
pub const BLOCK_SEPARATOR: &str = "\n\n";
pub const LOG_EXTENSION: &str = "log";
const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub fn join_blocks<S: AsRef<str>>(blocks: &[S]) -> String {
    blocks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Split a scenario log back into its blocks, dropping blank ones.
pub fn split_blocks(content: &str) -> Vec<&str> {
    content
        .split(BLOCK_SEPARATOR)
        .filter(|block| !block.trim().is_empty())
        .collect()
}

pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}.{LOG_EXTENSION}", now.format(LOG_TIMESTAMP_FORMAT))
}

fn ensure_dir(dir: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

fn write_file(path: &Path, content: &str) -> Result<(), PipelineError> {
    fs::write(path, content).map_err(|e| PipelineError::io(path, e))
}

/// Write `content` to `<dir>/<YYYYMMDDHHMMSS>.log`, creating `dir` if needed.
pub fn save_scenario_log(dir: &Path, content: &str) -> Result<PathBuf, PipelineError> {
    ensure_dir(dir)?;
    let path = dir.join(log_file_name(Local::now()));
    write_file(&path, content)?;
    Ok(path)
}

/// Write a generated test verbatim; an existing file of the same name is replaced.
pub fn save_test_file(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, PipelineError> {
    ensure_dir(dir)?;
    let path = dir.join(file_name);
    write_file(&path, content)?;
    Ok(path)
}

/// The `*.log` file in `dir` with the newest modification time.
///
/// A missing directory is the same as an empty one.
pub fn latest_log(dir: &Path) -> Result<Option<PathBuf>, PipelineError> {
    let pattern = format!(
        "{}/*.{LOG_EXTENSION}",
        glob::Pattern::escape(&dir.to_string_lossy())
    );

    let latest = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .max_by_key(|(modified, _): &(SystemTime, PathBuf)| *modified)
        .map(|(_, path)| path);

    Ok(latest)
}

pub fn read_log(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))
}
