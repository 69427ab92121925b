//! Code execution / verification tools, backed by the sandboxed subprocess
//! executor: `run_python_file` and `run_pytest`, each timeout-wrapped.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext, ToolSideEffect};
use crate::sandbox::executor::{CodeExecutor, ExecutionRequest, Language};

use super::filesystem::FsContext;
use super::traits::{Tool, ToolMetadata, ToolResult};

const DEFAULT_TIMEOUT_FAIL_EARLY: Duration = Duration::from_secs(10);
const DEFAULT_TIMEOUT_FULL: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct RunFileArgs {
    path: String,
    #[serde(default)]
    fail_early: bool,
}

pub struct RunPythonFileTool {
    pub fs: FsContext,
    pub executor: Arc<dyn CodeExecutor>,
}

#[async_trait]
impl Tool for RunPythonFileTool {
    fn name(&self) -> &str {
        "run_python_file"
    }
    fn description(&self) -> &str {
        "Run a Python file in the sandbox and capture stdout/stderr"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "fail_early": {"type": "boolean"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::CodeValidation, TaskType::ResultVerification])
            .with_side_effects([ToolSideEffect::CodeExecution])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: RunFileArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.fs.resolve(&args.path)?;
        let code = tokio::fs::read_to_string(&resolved).await?;
        let timeout = if args.fail_early { DEFAULT_TIMEOUT_FAIL_EARLY } else { DEFAULT_TIMEOUT_FULL };
        let request = ExecutionRequest::new(code, Language::Python).with_timeout(timeout);
        let result = self.executor.execute(request).await?;
        if result.success {
            Ok(ToolResult::success(result.combined_output()))
        } else if result.timed_out {
            Ok(ToolResult::failure(format!("{} timed out after {:?}", args.path, timeout)))
        } else {
            Ok(ToolResult::failure(result.combined_output()))
        }
    }
}

#[derive(Deserialize)]
struct RunPytestArgs {
    #[serde(default = "default_dot")]
    path: String,
}

fn default_dot() -> String {
    ".".to_string()
}

pub struct RunPytestTool {
    pub fs: FsContext,
}

#[async_trait]
impl Tool for RunPytestTool {
    fn name(&self) -> &str {
        "run_pytest"
    }
    fn description(&self) -> &str {
        "Run pytest against a workspace path and capture the result"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::ResultVerification, TaskType::CodeValidation])
            .with_side_effects([ToolSideEffect::CodeExecution])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: RunPytestArgs = serde_json::from_value(args).unwrap_or(RunPytestArgs { path: default_dot() });
        let resolved = self.fs.resolve(&args.path)?;

        let mut command = tokio::process::Command::new("python3");
        command.arg("-m").arg("pytest").arg(&resolved).current_dir(&self.fs.root);
        command.stdout(std::process::Stdio::piped()).stderr(std::process::Stdio::piped());

        let child = command.spawn().map_err(|e| crate::Error::Sandbox(format!("failed to spawn pytest: {}", e)))?;
        match tokio::time::timeout(DEFAULT_TIMEOUT_FULL, child.wait_with_output()).await {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if output.status.success() {
                    Ok(ToolResult::success(stdout))
                } else {
                    Ok(ToolResult::failure(format!("{}\n{}", stdout, stderr)))
                }
            }
            Ok(Err(e)) => Ok(ToolResult::failure(format!("pytest process error: {}", e))),
            Err(_) => Ok(ToolResult::failure(format!("pytest timed out after {:?}", DEFAULT_TIMEOUT_FULL))),
        }
    }
}
