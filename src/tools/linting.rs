//! Linting tools: contract-only. The registry carries full metadata and a
//! schema; the concrete linter binary is an injected collaborator so this
//! crate never hard-codes a specific Python/JS toolchain.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext};

use super::traits::{Tool, ToolMetadata, ToolResult};

/// A pluggable linter backend. The default registration leaves this unset
/// (see `tools::mod::build_default_registry`), in which case the tool
/// reports a clear "no linter configured" failure instead of silently
/// no-opping.
#[async_trait]
pub trait Linter: Send + Sync {
    async fn lint_paths(&self, paths: &[String]) -> Result<String>;
}

#[derive(Deserialize)]
struct LintTreeArgs {
    #[serde(default = "default_dot")]
    path: String,
}

fn default_dot() -> String {
    ".".to_string()
}

pub struct LintPythonTreeTool {
    pub linter: Option<Arc<dyn Linter>>,
}

#[async_trait]
impl Tool for LintPythonTreeTool {
    fn name(&self) -> &str {
        "lint_python_tree"
    }
    fn description(&self) -> &str {
        "Lint an entire Python source tree"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::CodeValidation]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: LintTreeArgs = serde_json::from_value(args).unwrap_or(LintTreeArgs { path: default_dot() });
        match &self.linter {
            Some(linter) => match linter.lint_paths(&[args.path]).await {
                Ok(report) => Ok(ToolResult::success(report)),
                Err(e) => Ok(ToolResult::failure(e.to_string())),
            },
            None => Ok(ToolResult::failure("no linter configured for this workspace")),
        }
    }
}

#[derive(Deserialize)]
struct LintFilesArgs {
    paths: Vec<String>,
}

pub struct LintFilesTool {
    pub linter: Option<Arc<dyn Linter>>,
}

#[async_trait]
impl Tool for LintFilesTool {
    fn name(&self) -> &str {
        "lint_files"
    }
    fn description(&self) -> &str {
        "Lint a specific list of files"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"paths": {"type": "array", "items": {"type": "string"}}}, "required": ["paths"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::CodeValidation]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: LintFilesArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        match &self.linter {
            Some(linter) => match linter.lint_paths(&args.paths).await {
                Ok(report) => Ok(ToolResult::success(report)),
                Err(e) => Ok(ToolResult::failure(e.to_string())),
            },
            None => Ok(ToolResult::failure("no linter configured for this workspace")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lint_without_backend_fails_clearly() {
        let tool = LintFilesTool { linter: None };
        let result = tool.execute(json!({"paths": ["a.py"]})).await.unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("no linter configured"));
    }
}
