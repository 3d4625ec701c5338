use colored::*;
use std::path::Path;

use crate::sanitize;

/// Environment variable that enables machine-readable JSON events when set to "1" or "true".
const MACHINE_LOG_ENV: &str = "TESTGEN_MACHINE_LOG";

/// Internal logs go through `log`; RUST_LOG wins, otherwise `-v` raises the level.
pub fn init_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var("RUST_LOG").is_err() {
        builder.filter_level(match verbosity {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        });
    }
    let _ = builder.try_init();
}

fn machine_log_enabled() -> bool {
    matches!(
        std::env::var(MACHINE_LOG_ENV)
            .ok()
            .as_deref()
            .map(str::to_ascii_lowercase)
            .as_deref(),
        Some("1") | Some("true")
    )
}

fn emit_machine_event(kind: &str, data: serde_json::Value) {
    if !machine_log_enabled() {
        return;
    }

    let event = serde_json::json!({
        "kind": kind,
        "data": data,
    });

    if let Ok(line) = serde_json::to_string(&event) {
        eprintln!("{line}");
    }
}

pub fn info(msg: impl AsRef<str>) {
    let raw = msg.as_ref();
    println!("{}", sanitize::sanitize_preview_for_console(raw));
    emit_machine_event("info", serde_json::json!({ "message": raw }));
}

/// Like [`info`] without the preview cap, for whole scenario logs and generated code.
pub fn info_full(msg: impl AsRef<str>) {
    println!("{}", sanitize::sanitize_for_console(msg.as_ref()));
}

pub fn warn(msg: impl AsRef<str>) {
    let raw = msg.as_ref();
    eprintln!("{}", sanitize::sanitize_preview_for_console(raw).yellow());
    emit_machine_event("warn", serde_json::json!({ "message": raw }));
}

pub fn error(msg: impl AsRef<str>) {
    let raw = msg.as_ref();
    eprintln!(
        "{} {}",
        "✗".red().bold(),
        sanitize::sanitize_preview_for_console(raw).red()
    );
    emit_machine_event("error", serde_json::json!({ "message": raw }));
}

pub fn header(agent: &str, mode: &str, url: Option<&str>) {
    let a = sanitize::sanitize_preview_for_console(agent);
    let m = sanitize::sanitize_preview_for_console(mode);
    let u = sanitize::sanitize_preview_for_console(url.unwrap_or("(URL not set)"));

    println!(
        "{} {} {} | {} | {}",
        ">>".bold(),
        "testgen".bold(),
        m.bold(),
        a.cyan(),
        u.dimmed()
    );
    emit_machine_event(
        "header",
        serde_json::json!({
            "agent": agent,
            "mode": mode,
            "url": url,
        }),
    );
}

pub fn section_title(title: &str) {
    let safe = sanitize::sanitize_preview_for_console(title);
    println!("\n{} {}", "●".blue().bold(), safe.blue());
}

pub fn task_preview(task: &str) {
    let safe = sanitize::sanitize_preview_for_console(task);
    println!("{}", safe.dimmed());
}

pub fn file_saved(kind: &str, path: &Path) {
    let shown = path.display().to_string();
    println!(
        "  {} {} saved to {}",
        "└─".green(),
        kind,
        sanitize::sanitize_preview_for_console(&shown).green()
    );
    emit_machine_event(
        "file_saved",
        serde_json::json!({ "kind": kind, "path": shown }),
    );
}

pub fn skipped(reason: &str) {
    let safe = sanitize::sanitize_preview_for_console(reason);
    println!("  {} {}", "└─".yellow(), safe.yellow());
    emit_machine_event("skipped", serde_json::json!({ "reason": reason }));
}

pub fn summary(text: &str) {
    let safe = sanitize::sanitize_preview_for_console(text);
    println!("\n{} {}", "✓".green().bold(), safe);
    emit_machine_event("summary", serde_json::json!({ "text": text }));
}
