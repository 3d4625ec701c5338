use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

use testgen::{
    AgentError, MockAgent, PageDescriptor, Pipeline, PipelineError, RunJournal, Settings, Target,
};

fn settings_in(tmp: &TempDir) -> Settings {
    Settings {
        target: Target {
            url: Some("https://shop.example.com".to_string()),
            user_id: Some("tester".to_string()),
            password: Some("hunter22".to_string()),
        },
        scenario_language: Some("Korean".to_string()),
        scenario_dir: tmp.path().join("scenario"),
        test_dir: tmp.path().join("tests"),
        ..Default::default()
    }
}

fn pipeline(settings: Settings, agent: &MockAgent) -> Pipeline {
    Pipeline::new(settings, Box::new(agent.clone()))
}

fn log_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "log"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn write_log(dir: &Path, name: &str, content: &str, age: Duration) {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(SystemTime::now() - age)
        .unwrap();
}

#[tokio::test]
async fn scenario_mode_skips_incomplete_pages_and_joins_blocks() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();
    agent.push_text(
        r#"[
            {"path": "/", "purpose": "Landing page"},
            {"path": "/users/42"},
            {"path": "/login", "purpose": "Sign in"}
        ]"#,
    );
    agent.push_text("path: /,\nactions:\n  - test: open\n    expect: hero shown");
    agent.push_text("path: /login,\nactions:\n  - test: submit\n    expect: dashboard");

    let settings = settings_in(&tmp);
    let scenario_dir = settings.scenario_dir.clone();
    let report = pipeline(settings, &agent).run_scenario_mode().await.unwrap();

    assert_eq!(report.pages_discovered, 3);
    assert_eq!(report.pages_used, 2);
    assert_eq!(agent.calls().len(), 3);

    let logs = log_files(&scenario_dir);
    assert_eq!(logs, vec![report.log_path.clone()]);
    let file_name = report.log_path.file_name().unwrap().to_string_lossy();
    assert_eq!(file_name.len(), "YYYYMMDDHHMMSS.log".len());
    assert!(file_name[..14].chars().all(|c| c.is_ascii_digit()));

    let content = fs::read_to_string(&report.log_path).unwrap();
    assert_eq!(
        content,
        "path: /,\nactions:\n  - test: open\n    expect: hero shown\n\n\
         path: /login,\nactions:\n  - test: submit\n    expect: dashboard"
    );
}

#[tokio::test]
async fn scenario_prompts_carry_page_language_and_stage_settings() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();
    agent.push_text(r#"[{"path": "/login", "purpose": "Sign in"}]"#);
    agent.push_text("path: /login,\nactions: []");

    pipeline(settings_in(&tmp), &agent)
        .run_scenario_mode()
        .await
        .unwrap();

    let calls = agent.calls();
    let discovery = &calls[0];
    assert!(discovery.task.contains("https://shop.example.com"));
    assert!(discovery.task.contains("- id: tester"));
    assert_eq!(discovery.llm.max_tokens, None);
    assert_eq!(discovery.llm.temperature, Some(0.8));

    let scenario = &calls[1];
    assert!(scenario.task.contains("- Page: /login"));
    assert!(scenario.task.contains("Purpose: Sign in"));
    assert!(scenario.task.contains("written in Korean"));
    assert_eq!(scenario.llm.max_tokens, Some(5000));
}

#[tokio::test]
async fn malformed_discovery_output_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();
    agent.push_text("Here are the pages: /, /login");

    let settings = settings_in(&tmp);
    let scenario_dir = settings.scenario_dir.clone();
    let err = pipeline(settings, &agent)
        .run_scenario_mode()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Discovery(_)));
    assert_eq!(agent.calls().len(), 1);
    assert!(!scenario_dir.exists());
}

#[tokio::test]
async fn discovery_object_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();
    agent.push_text(r#"{"path": "/", "purpose": "Landing"}"#);

    let err = pipeline(settings_in(&tmp), &agent)
        .run_scenario_mode()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::DiscoveryShape("an object")));
}

#[tokio::test]
async fn scenario_agent_failure_writes_no_log() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();
    agent.push_text(r#"[{"path": "/", "purpose": "Landing"}, {"path": "/a", "purpose": "A"}]"#);
    agent.push_text("path: /,\nactions: []");
    agent.push_result(Err(AgentError::ApiError("rate limited".to_string())));

    let settings = settings_in(&tmp);
    let scenario_dir = settings.scenario_dir.clone();
    let err = pipeline(settings, &agent)
        .run_scenario_mode()
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Agent(AgentError::ApiError(_))));
    assert_eq!(agent.calls().len(), 3);
    assert!(log_files(&scenario_dir).is_empty());
}

#[tokio::test]
async fn no_complete_pages_still_writes_an_empty_log() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();

    let report = pipeline(settings_in(&tmp), &agent)
        .generate_scenarios(&[PageDescriptor {
            path: Some("/".to_string()),
            purpose: None,
        }])
        .await
        .unwrap();

    assert_eq!(report.pages_used, 0);
    assert!(agent.calls().is_empty());
    assert_eq!(fs::read_to_string(&report.log_path).unwrap(), "");
}

#[tokio::test]
async fn codegen_uses_newest_log_and_writes_one_file_per_block() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    write_log(
        &settings.scenario_dir,
        "20240101000000.log",
        "path: /old,\nactions: []",
        Duration::from_secs(3600),
    );
    write_log(
        &settings.scenario_dir,
        "20230101000000.log",
        "path: /,\nactions: [home]\n\npath: /users/42,\nactions: [profile]",
        Duration::from_secs(5),
    );

    let agent = MockAgent::new();
    agent.push_text("test('home', () => {});");
    agent.push_text("test('profile', () => {});");

    let test_dir = settings.test_dir.clone();
    let report = pipeline(settings, &agent).generate_code().await.unwrap();

    assert!(
        report
            .source_log
            .as_ref()
            .is_some_and(|p| p.ends_with("20230101000000.log"))
    );
    assert_eq!(report.skipped, 0);
    assert_eq!(
        report.written,
        vec![
            test_dir.join("index.test.js"),
            test_dir.join("users_42.test.js")
        ]
    );
    assert_eq!(
        fs::read_to_string(test_dir.join("index.test.js")).unwrap(),
        "test('home', () => {});"
    );
    assert_eq!(
        fs::read_to_string(test_dir.join("users_42.test.js")).unwrap(),
        "test('profile', () => {});"
    );
    assert!(!test_dir.join("old.test.js").exists());

    let calls = agent.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].task.contains("path: /,\nactions: [home]"));
    assert!(calls[1].task.contains("path: /users/42,\nactions: [profile]"));
    assert_eq!(calls[1].llm.max_tokens, None);
}

#[tokio::test]
async fn codegen_without_logs_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let agent = MockAgent::new();

    // Directory missing entirely
    let report = pipeline(settings.clone(), &agent)
        .generate_code()
        .await
        .unwrap();
    assert_eq!(report, Default::default());

    // Directory present but holding no logs
    fs::create_dir_all(&settings.scenario_dir).unwrap();
    fs::write(settings.scenario_dir.join("notes.txt"), "path: /,\n").unwrap();
    let test_dir = settings.test_dir.clone();
    let report = pipeline(settings, &agent).generate_code().await.unwrap();
    assert!(report.source_log.is_none());

    assert!(agent.calls().is_empty());
    assert!(!test_dir.exists());
}

#[tokio::test]
async fn codegen_writes_empty_file_when_agent_returns_nothing() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    write_log(
        &settings.scenario_dir,
        "20240101000000.log",
        "path: /checkout,\nactions: []",
        Duration::ZERO,
    );

    // No queued result: the mock answers with an empty run
    let agent = MockAgent::new();
    let test_dir = settings.test_dir.clone();
    let report = pipeline(settings, &agent).generate_code().await.unwrap();

    let written = test_dir.join("checkout.test.js");
    assert_eq!(report.written, vec![written.clone()]);
    assert_eq!(fs::metadata(&written).unwrap().len(), 0);
}

#[tokio::test]
async fn codegen_skips_blocks_without_a_path_line() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    write_log(
        &settings.scenario_dir,
        "20240101000000.log",
        "no path on this line\n\npath: /cart.html,\nactions: []",
        Duration::ZERO,
    );

    let agent = MockAgent::new();
    agent.push_text("cart");
    let test_dir = settings.test_dir.clone();
    let report = pipeline(settings, &agent).generate_code().await.unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.written, vec![test_dir.join("cart.test.js")]);
    assert_eq!(agent.calls().len(), 1);
}

#[tokio::test]
async fn split_block_fragment_does_not_replace_root_test() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    // A blank line inside the /login block leaves a fragment whose path is ""
    write_log(
        &settings.scenario_dir,
        "20240101000000.log",
        "path: /,\nactions: []\n\npath: /login,\n\nactions:\n  - test: submit",
        Duration::ZERO,
    );

    let agent = MockAgent::new();
    agent.push_text("root");
    agent.push_text("login");
    agent.push_text("fragment");

    let test_dir = settings.test_dir.clone();
    let report = pipeline(settings, &agent).generate_code().await.unwrap();

    assert_eq!(
        report.written,
        vec![
            test_dir.join("index.test.js"),
            test_dir.join("login.test.js"),
            test_dir.join(".test.js"),
        ]
    );
    assert_eq!(
        fs::read_to_string(test_dir.join("index.test.js")).unwrap(),
        "root"
    );
}

#[tokio::test]
async fn codegen_failure_keeps_files_already_written() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    write_log(
        &settings.scenario_dir,
        "20240101000000.log",
        "path: /,\nactions: []\n\npath: /about,\nactions: []\n\npath: /faq,\nactions: []",
        Duration::ZERO,
    );

    let agent = MockAgent::new();
    agent.push_text("home");
    agent.push_result(Err(AgentError::CommandFailed(
        "exit code 1: browser crashed".to_string(),
    )));

    let test_dir = settings.test_dir.clone();
    let err = pipeline(settings, &agent).generate_code().await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Agent(AgentError::CommandFailed(_))
    ));
    assert_eq!(agent.calls().len(), 2);
    assert_eq!(
        fs::read_to_string(test_dir.join("index.test.js")).unwrap(),
        "home"
    );
    assert!(!test_dir.join("about.test.js").exists());
    assert!(!test_dir.join("faq.test.js").exists());
}

#[tokio::test]
async fn scenario_then_code_round_trip() {
    let tmp = TempDir::new().unwrap();
    let agent = MockAgent::new();
    agent.push_text(r#"[{"path": "/search?q=x", "purpose": "Search"}]"#);
    agent.push_text("path: /search?q=x,\nactions:\n  - test: query\n    expect: results");
    agent.push_text("test('search', () => {});");

    let settings = settings_in(&tmp);
    let test_dir = settings.test_dir.clone();
    let pipeline = pipeline(settings, &agent);

    pipeline.run_scenario_mode().await.unwrap();
    let report = pipeline.generate_code().await.unwrap();

    assert_eq!(report.written, vec![test_dir.join("search?q=x.test.js")]);
    assert_eq!(agent.calls().len(), 3);
}

#[tokio::test]
async fn journal_records_calls_and_files() {
    let tmp = TempDir::new().unwrap();
    let journal_dir = tmp.path().join("journal");
    let agent = MockAgent::new();
    agent.push_text(r#"[{"path": "/", "purpose": "Landing"}]"#);
    agent.push_text("path: /,\nactions: []");

    let journal = RunJournal::new(journal_dir.clone())
        .unwrap()
        .with_run_id("test-run");
    pipeline(settings_in(&tmp), &agent)
        .with_journal(journal)
        .run_scenario_mode()
        .await
        .unwrap();

    let content = fs::read_to_string(journal_dir.join("runs.jsonl")).unwrap();
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    let steps: Vec<(&str, &str)> = events
        .iter()
        .map(|e| (e["stage"].as_str().unwrap(), e["step"].as_str().unwrap()))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("discovery", "agent_call"),
            ("discovery", "pages"),
            ("scenario", "agent_call"),
            ("scenario", "file_written"),
            ("scenario", "scenarios"),
        ]
    );
    assert!(events.iter().all(|e| e["run_id"] == "test-run"));
    assert!(!content.contains("hunter22"));
}
