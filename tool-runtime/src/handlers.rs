//! Tool handlers bridging the registry to the sandbox components.
//!
//! Each handler folds every failure into the result envelope. Argument
//! problems, guard denials, evaluation errors, and filesystem failures all
//! come back as failed results with a message; nothing here returns `Err` or
//! panics on caller input.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use tool_builtins::{BuiltinError, FileTools, WeatherClient, current_time, system_info};
use tool_eval::Evaluator;
use tool_guard::CommandGuard;
use tool_primitives::{ToolRequest, ToolResult};
use tool_sandbox::{PathValidator, ProcessRunner};

use crate::registry::Tool;

/// Folds a builtin outcome into the result envelope.
fn from_builtin(outcome: Result<serde_json::Value, BuiltinError>) -> ToolResult {
    match outcome {
        Ok(payload) => ToolResult::ok(payload),
        Err(err) => ToolResult::fail(err.to_string()),
    }
}

/// Reports the current local date and time.
pub(crate) struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    async fn invoke(&self, _request: &ToolRequest) -> ToolResult {
        ToolResult::ok(json!({ "current_time": current_time() }))
    }
}

/// Reports basic facts about the host.
pub(crate) struct SystemInfoTool;

#[async_trait]
impl Tool for SystemInfoTool {
    async fn invoke(&self, _request: &ToolRequest) -> ToolResult {
        ToolResult::ok(system_info())
    }
}

/// Evaluates a restricted arithmetic expression.
pub(crate) struct CalculateTool {
    evaluator: Evaluator,
}

impl CalculateTool {
    pub(crate) fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }
}

#[async_trait]
impl Tool for CalculateTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let expression = match request.str_arg("expression") {
            Ok(expression) => expression,
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        match self.evaluator.evaluate(expression) {
            Ok(value) => ToolResult::ok(json!({
                "expression": expression,
                "result": value,
                "formatted": format_number(value),
            })),
            Err(err) => ToolResult::fail(err.to_string()),
        }
    }
}

/// Renders whole numbers without a trailing fraction.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

/// Runs a shell command after the guard approves it.
pub(crate) struct ExecuteCommandTool {
    guard: Arc<CommandGuard>,
    runner: ProcessRunner,
    validator: PathValidator,
}

impl ExecuteCommandTool {
    pub(crate) fn new(
        guard: Arc<CommandGuard>,
        runner: ProcessRunner,
        validator: PathValidator,
    ) -> Self {
        Self {
            guard,
            runner,
            validator,
        }
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let command = match request.str_arg("command") {
            Ok(command) => command,
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        let decision = self.guard.check(command);
        if !decision.is_allowed() {
            debug!(id = %request.id(), rule = decision.rule(), "command rejected before execution");
            let reason = decision
                .reason()
                .unwrap_or("command matches a denied pattern")
                .to_owned();
            return ToolResult::fail(reason);
        }

        let working_dir = match request.opt_str_arg("working_directory") {
            Ok(Some(requested)) => {
                let resolved = self.validator.validate(requested);
                if !resolved.is_within_bounds() {
                    return ToolResult::fail(format!(
                        "working directory `{requested}` is outside the sandbox root"
                    ));
                }
                resolved.resolved().to_path_buf()
            }
            Ok(None) => self.validator.root().to_path_buf(),
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        let outcome = match self.runner.run(command, &working_dir).await {
            Ok(outcome) => outcome,
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        let payload = json!({
            "command": command,
            "exit_code": outcome.exit_code,
            "stdout": outcome.stdout,
            "stderr": outcome.stderr,
            "stdout_truncated": outcome.stdout_truncated,
            "stderr_truncated": outcome.stderr_truncated,
            "timed_out": outcome.timed_out,
        });

        if outcome.timed_out {
            let secs = self.runner.config().timeout().as_secs();
            return ToolResult::fail_with_payload(
                format!("command timed out after {secs}s"),
                payload,
            );
        }

        match outcome.exit_code {
            Some(0) => ToolResult::ok(payload),
            Some(code) => {
                ToolResult::fail_with_payload(format!("command exited with status {code}"), payload)
            }
            None => ToolResult::fail_with_payload("command terminated by signal", payload),
        }
    }
}

/// Creates or overwrites a file inside the sandbox root.
pub(crate) struct CreateFileTool {
    files: Arc<FileTools>,
}

impl CreateFileTool {
    pub(crate) fn new(files: Arc<FileTools>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for CreateFileTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let (path, content) = match (request.str_arg("path"), request.str_arg("content")) {
            (Ok(path), Ok(content)) => (path, content),
            (Err(err), _) | (_, Err(err)) => return ToolResult::fail(err.to_string()),
        };

        from_builtin(self.files.create_file(path, content).await)
    }
}

/// Reads a file inside the sandbox root.
pub(crate) struct ReadFileTool {
    files: Arc<FileTools>,
}

impl ReadFileTool {
    pub(crate) fn new(files: Arc<FileTools>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        match request.str_arg("path") {
            Ok(path) => from_builtin(self.files.read_file(path).await),
            Err(err) => ToolResult::fail(err.to_string()),
        }
    }
}

/// Lists a directory inside the sandbox root.
pub(crate) struct ListDirectoryTool {
    files: Arc<FileTools>,
}

impl ListDirectoryTool {
    pub(crate) fn new(files: Arc<FileTools>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for ListDirectoryTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let path = match request.opt_str_arg("path") {
            Ok(path) => path.unwrap_or("."),
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        from_builtin(self.files.list_directory(path).await)
    }
}

/// Searches files under a directory for a substring.
pub(crate) struct SearchFilesTool {
    files: Arc<FileTools>,
}

impl SearchFilesTool {
    pub(crate) fn new(files: Arc<FileTools>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for SearchFilesTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let pattern = match request.str_arg("pattern") {
            Ok(pattern) => pattern,
            Err(err) => return ToolResult::fail(err.to_string()),
        };
        let directory = match request.opt_str_arg("directory") {
            Ok(directory) => directory.unwrap_or("."),
            Err(err) => return ToolResult::fail(err.to_string()),
        };
        let extension = match request.opt_str_arg("extension") {
            Ok(extension) => extension,
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        from_builtin(self.files.search_files(directory, pattern, extension).await)
    }
}

/// Creates a uniquely named scratch file inside the sandbox root.
pub(crate) struct CreateTempFileTool {
    files: Arc<FileTools>,
}

impl CreateTempFileTool {
    pub(crate) fn new(files: Arc<FileTools>) -> Self {
        Self { files }
    }
}

#[async_trait]
impl Tool for CreateTempFileTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        let content = match request.opt_str_arg("content") {
            Ok(content) => content.unwrap_or(""),
            Err(err) => return ToolResult::fail(err.to_string()),
        };
        let suffix = match request.opt_str_arg("suffix") {
            Ok(suffix) => suffix.unwrap_or(".txt"),
            Err(err) => return ToolResult::fail(err.to_string()),
        };

        from_builtin(self.files.create_temp_file(content, suffix).await)
    }
}

/// Looks up current weather conditions for a city.
pub(crate) struct WeatherTool {
    client: WeatherClient,
}

impl WeatherTool {
    pub(crate) fn new(client: WeatherClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    async fn invoke(&self, request: &ToolRequest) -> ToolResult {
        match request.str_arg("city") {
            Ok(city) => from_builtin(self.client.current(city).await),
            Err(err) => ToolResult::fail(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_numbers_lose_the_fraction() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[tokio::test]
    async fn calculate_reports_missing_arguments() {
        let tool = CalculateTool::new(Evaluator::default());
        let result = tool.invoke(&ToolRequest::new("calculate")).await;
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("expression"));
    }

    #[tokio::test]
    async fn calculate_folds_evaluation_errors() {
        let tool = CalculateTool::new(Evaluator::default());
        let request = ToolRequest::new("calculate").with_argument("expression", "1/0");
        let result = tool.invoke(&request).await;
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("division by zero"));
    }

    #[tokio::test]
    async fn current_time_ignores_arguments() {
        let result = CurrentTimeTool
            .invoke(&ToolRequest::new("get_current_time"))
            .await;
        assert!(result.is_success());
        assert!(result.payload()["current_time"].is_string());
    }
}
