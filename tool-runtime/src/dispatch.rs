//! Request routing over the tool registry.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use tool_builtins::{FileTools, WeatherClient};
use tool_config::RuntimeConfig;
use tool_eval::{Evaluator, FunctionSet};
use tool_guard::{CommandGuard, GuardError};
use tool_primitives::{ToolRequest, ToolResult};
use tool_sandbox::{PathError, PathValidator, ProcessRunner, RunnerConfig};

use crate::handlers::{
    CalculateTool, CreateFileTool, CreateTempFileTool, CurrentTimeTool, ExecuteCommandTool,
    ListDirectoryTool, ReadFileTool, SearchFilesTool, SystemInfoTool, WeatherTool,
};
use crate::registry::{RegistryError, ToolMetadata, ToolRegistry};

/// Errors surfaced while constructing a dispatcher.
///
/// All of these are configuration problems found at startup; dispatching
/// itself never fails with an `Err`.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A tool could not be registered.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A configured deny rule failed to compile.
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// The sandbox root is unusable.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// The single entry point for tool invocations.
///
/// Construction wires every handler to the shared sandbox components; after
/// that the dispatcher is immutable and safe to share across tasks.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ToolRegistry,
}

impl Dispatcher {
    /// Builds a dispatcher with every built-in tool wired to the supplied
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the sandbox root cannot be resolved, a
    /// configured deny rule fails to compile, or tool registration collides.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self, DispatchError> {
        let validator = PathValidator::new(&config.sandbox_root)?;

        let mut guard = CommandGuard::with_default_rules();
        guard.extend_from_specs(&config.deny_rules)?;
        let guard = Arc::new(guard);

        let runner = ProcessRunner::new(RunnerConfig::new(
            config.command_timeout(),
            config.max_output_bytes,
        ));

        let functions = match &config.functions {
            Some(names) => FunctionSet::restricted(names),
            None => FunctionSet::all(),
        };
        let evaluator = Evaluator::new(functions);

        let files = Arc::new(FileTools::new(validator.clone()));
        let weather = WeatherClient::new(
            config.weather.endpoint.clone(),
            config.weather.api_key.clone(),
        );

        let registry = ToolRegistry::new();
        let register = |name: &str, description: &str| ToolMetadata::new(name, description);

        registry.register_tool(
            register("get_current_time", "Current local date and time")?,
            CurrentTimeTool,
        )?;
        registry.register_tool(
            register("get_system_info", "Basic facts about the host system")?,
            SystemInfoTool,
        )?;
        registry.register_tool(
            register("calculate", "Evaluate a restricted arithmetic expression")?,
            CalculateTool::new(evaluator),
        )?;
        registry.register_tool(
            register(
                "execute_command",
                "Run a shell command inside the sandbox under a timeout",
            )?,
            ExecuteCommandTool::new(guard, runner, validator),
        )?;
        registry.register_tool(
            register("create_file", "Create or overwrite a file inside the sandbox")?,
            CreateFileTool::new(Arc::clone(&files)),
        )?;
        registry.register_tool(
            register("read_file", "Read a file inside the sandbox")?,
            ReadFileTool::new(Arc::clone(&files)),
        )?;
        registry.register_tool(
            register("list_directory", "List a directory inside the sandbox")?,
            ListDirectoryTool::new(Arc::clone(&files)),
        )?;
        registry.register_tool(
            register("search_files", "Search sandbox files for a substring")?,
            SearchFilesTool::new(Arc::clone(&files)),
        )?;
        registry.register_tool(
            register(
                "create_temporary_file",
                "Create a uniquely named scratch file inside the sandbox",
            )?,
            CreateTempFileTool::new(files),
        )?;
        registry.register_tool(
            register("get_weather", "Current weather conditions for a city")?,
            WeatherTool::new(weather),
        )?;

        Ok(Self { registry })
    }

    /// Routes one request to its tool and returns the normalized result.
    ///
    /// An unknown tool name is a failed result, not an error; the caller
    /// always gets exactly one result per request.
    pub async fn dispatch(&self, request: &ToolRequest) -> ToolResult {
        let Some(handle) = self.registry.get(request.tool_name()) else {
            debug!(id = %request.id(), tool = request.tool_name(), "unknown tool requested");
            return ToolResult::fail(format!("unknown tool `{}`", request.tool_name()));
        };

        debug!(id = %request.id(), tool = request.tool_name(), "dispatching request");
        handle.invoke(request).await
    }

    /// Lists the metadata of every registered tool, sorted by name.
    #[must_use]
    pub fn tools(&self) -> Vec<ToolMetadata> {
        self.registry.list()
    }
}
