//! End-to-end dispatch tests over a temporary sandbox root.

use std::path::PathBuf;

use tempfile::TempDir;
use tool_config::RuntimeConfig;
use tool_primitives::ToolRequest;
use tool_runtime::Dispatcher;

fn sandbox() -> (TempDir, Dispatcher) {
    let dir = TempDir::new().unwrap();
    let config = RuntimeConfig {
        sandbox_root: dir.path().to_path_buf(),
        command_timeout_secs: 2,
        ..RuntimeConfig::default()
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();
    (dir, dispatcher)
}

#[tokio::test]
async fn lists_every_builtin_tool() {
    let (_dir, dispatcher) = sandbox();
    let names: Vec<_> = dispatcher
        .tools()
        .into_iter()
        .map(|m| m.name().to_owned())
        .collect();

    assert_eq!(
        names,
        [
            "calculate",
            "create_file",
            "create_temporary_file",
            "execute_command",
            "get_current_time",
            "get_system_info",
            "get_weather",
            "list_directory",
            "read_file",
            "search_files",
        ]
    );
}

#[tokio::test]
async fn unknown_tool_is_a_failed_result() {
    let (_dir, dispatcher) = sandbox();
    let result = dispatcher.dispatch(&ToolRequest::new("launch_rockets")).await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("unknown tool `launch_rockets`"));
}

#[tokio::test]
async fn calculates_with_integer_formatting() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("calculate").with_argument("expression", "sqrt(16) + pow(2, 3)");
    let result = dispatcher.dispatch(&request).await;

    assert!(result.is_success());
    assert_eq!(result.payload()["result"], 12.0);
    assert_eq!(result.payload()["formatted"], "12");
}

#[tokio::test]
async fn foreign_syntax_never_evaluates() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("calculate").with_argument("expression", "import os");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("invalid expression"));
}

#[tokio::test]
async fn destructive_command_is_denied_without_running() {
    let (dir, dispatcher) = sandbox();
    let request = ToolRequest::new("execute_command")
        .with_argument("command", "rm -rf / && echo proof > denied-marker.txt");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("denied pattern"));
    // Nothing may have executed.
    assert!(!dir.path().join("denied-marker.txt").exists());
}

#[tokio::test]
async fn benign_command_runs_in_the_sandbox_root() {
    let (dir, dispatcher) = sandbox();
    let request = ToolRequest::new("execute_command").with_argument("command", "pwd");
    let result = dispatcher.dispatch(&request).await;

    assert!(result.is_success());
    assert_eq!(result.payload()["exit_code"], 0);
    let canonical = dir.path().canonicalize().unwrap();
    assert_eq!(
        result.payload()["stdout"].as_str().unwrap().trim(),
        canonical.to_string_lossy()
    );
}

#[tokio::test]
async fn nonzero_exit_keeps_the_output() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("execute_command")
        .with_argument("command", "echo before-failure; exit 3");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("command exited with status 3"));
    assert!(result.payload()["stdout"]
        .as_str()
        .unwrap()
        .contains("before-failure"));
}

#[tokio::test]
async fn timeout_is_reported_with_partial_output() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("execute_command")
        .with_argument("command", "echo started; sleep 60; echo finished");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert_eq!(result.error(), Some("command timed out after 2s"));
    assert_eq!(result.payload()["timed_out"], true);
    assert!(result.payload()["stdout"].as_str().unwrap().contains("started"));
}

#[tokio::test]
async fn escaping_working_directory_is_rejected() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("execute_command")
        .with_argument("command", "pwd")
        .with_argument("working_directory", "../..");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("outside the sandbox root"));
}

#[tokio::test]
async fn file_round_trip_through_dispatch() {
    let (_dir, dispatcher) = sandbox();

    let create = ToolRequest::new("create_file")
        .with_argument("path", "notes/plan.txt")
        .with_argument("content", "step one");
    assert!(dispatcher.dispatch(&create).await.is_success());

    let read = ToolRequest::new("read_file").with_argument("path", "notes/plan.txt");
    let result = dispatcher.dispatch(&read).await;
    assert!(result.is_success());
    assert_eq!(result.payload()["content"], "step one");

    let list = ToolRequest::new("list_directory").with_argument("path", "notes");
    let result = dispatcher.dispatch(&list).await;
    assert!(result.is_success());
    assert_eq!(result.payload()["total_items"], 1);
}

#[tokio::test]
async fn path_escape_is_a_failed_result() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("read_file").with_argument("path", "../../etc/passwd");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("outside"));
}

#[tokio::test]
async fn search_finds_created_content() {
    let (_dir, dispatcher) = sandbox();
    let create = ToolRequest::new("create_file")
        .with_argument("path", "src/lib.rs")
        .with_argument("content", "pub fn answer() -> u32 { 42 }\n");
    assert!(dispatcher.dispatch(&create).await.is_success());

    let search = ToolRequest::new("search_files")
        .with_argument("pattern", "answer")
        .with_argument("extension", ".rs");
    let result = dispatcher.dispatch(&search).await;

    assert!(result.is_success());
    assert_eq!(result.payload()["total_files_with_matches"], 1);
}

#[tokio::test]
async fn temp_file_lands_in_the_sandbox() {
    let (dir, dispatcher) = sandbox();
    let request = ToolRequest::new("create_temporary_file")
        .with_argument("content", "scratch")
        .with_argument("suffix", ".log");
    let result = dispatcher.dispatch(&request).await;

    assert!(result.is_success());
    let path = PathBuf::from(result.payload()["path"].as_str().unwrap());
    assert!(path.starts_with(dir.path().canonicalize().unwrap()));
    assert!(path.extension().is_some_and(|ext| ext == "log"));
}

#[tokio::test]
async fn temp_file_suffix_cannot_escape_the_sandbox() {
    let (dir, dispatcher) = sandbox();
    let request = ToolRequest::new("create_temporary_file")
        .with_argument("content", "x")
        .with_argument("suffix", "/../../../../escape.txt");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("outside"));
    assert!(!dir.path().join("../escape.txt").exists());
}

#[tokio::test]
async fn weather_without_a_key_fails_cleanly() {
    let (_dir, dispatcher) = sandbox();
    let request = ToolRequest::new("get_weather").with_argument("city", "Lisbon");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("api key"));
}

#[tokio::test]
async fn configured_deny_rules_extend_the_defaults() {
    let dir = TempDir::new().unwrap();
    let config = RuntimeConfig {
        sandbox_root: dir.path().to_path_buf(),
        deny_rules: vec![tool_guard::RuleSpec {
            name: "no-curl".into(),
            pattern: "curl".into(),
            kind: tool_guard::MatchKind::Substring,
        }],
        ..RuntimeConfig::default()
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();

    let request = ToolRequest::new("execute_command")
        .with_argument("command", "curl https://example.com");
    let result = dispatcher.dispatch(&request).await;

    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("no-curl"));
}

#[tokio::test]
async fn restricted_function_set_applies_to_calculate() {
    let dir = TempDir::new().unwrap();
    let config = RuntimeConfig {
        sandbox_root: dir.path().to_path_buf(),
        functions: Some(vec!["sqrt".into()]),
        ..RuntimeConfig::default()
    };
    let dispatcher = Dispatcher::from_config(&config).unwrap();

    let allowed = ToolRequest::new("calculate").with_argument("expression", "sqrt(9)");
    assert!(dispatcher.dispatch(&allowed).await.is_success());

    let disabled = ToolRequest::new("calculate").with_argument("expression", "sin(0)");
    let result = dispatcher.dispatch(&disabled).await;
    assert!(!result.is_success());
    assert!(result.error().unwrap().contains("unknown identifier"));
}
