//! Git tools, implemented as subprocess calls to the system `git` binary.
//! The two mutating calls are gated by `tools.allow_git_write`.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::process::Command;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::state::{TaskType, ToolContext, ToolSideEffect};

use super::traits::{Tool, ToolMetadata, ToolResult};

#[derive(Clone)]
pub struct GitContext {
    pub root: std::path::PathBuf,
    pub config: Arc<Config>,
}

impl GitContext {
    pub fn new(root: std::path::PathBuf, config: Arc<Config>) -> Self {
        GitContext { root, config }
    }

    async fn run(&self, args: &[&str]) -> Result<ToolResult> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await
            .map_err(|e| Error::Sandbox(format!("failed to spawn git: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(ToolResult::success(stdout))
        } else {
            Ok(ToolResult::failure(if stderr.is_empty() { stdout } else { stderr }))
        }
    }
}

pub struct GitStatusTool(pub GitContext);

#[async_trait]
impl Tool for GitStatusTool {
    fn name(&self) -> &str {
        "git_status"
    }
    fn description(&self) -> &str {
        "Show the working tree status"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::ResultVerification, TaskType::CodeAnalysis]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, _args: Value) -> Result<ToolResult> {
        self.0.run(&["status", "--short"]).await
    }
}

pub struct GitDiffTool(pub GitContext);

#[async_trait]
impl Tool for GitDiffTool {
    fn name(&self) -> &str {
        "git_diff"
    }
    fn description(&self) -> &str {
        "Show unstaged changes"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::ResultVerification, TaskType::CodeAnalysis]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, _args: Value) -> Result<ToolResult> {
        self.0.run(&["diff"]).await
    }
}

pub struct GitStageAllTool(pub GitContext);

#[async_trait]
impl Tool for GitStageAllTool {
    fn name(&self) -> &str {
        "git_stage_all"
    }
    fn description(&self) -> &str {
        "Stage all changes (requires tools.allow_git_write)"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::MetaTool])
            .with_side_effects([ToolSideEffect::StateChange])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, _args: Value) -> Result<ToolResult> {
        if !self.0.config.tools.allow_git_write {
            return Ok(ToolResult::failure("git write operations are disabled (tools.allow_git_write=false)"));
        }
        self.0.run(&["add", "-A"]).await
    }
}

#[derive(Deserialize)]
struct CommitArgs {
    message: String,
}

pub struct GitCommitTool(pub GitContext);

#[async_trait]
impl Tool for GitCommitTool {
    fn name(&self) -> &str {
        "git_commit"
    }
    fn description(&self) -> &str {
        "Commit staged changes (requires tools.allow_git_write)"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"message": {"type": "string"}}, "required": ["message"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::MetaTool])
            .with_side_effects([ToolSideEffect::StateChange])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        if !self.0.config.tools.allow_git_write {
            return Ok(ToolResult::failure("git write operations are disabled (tools.allow_git_write=false)"));
        }
        let args: CommitArgs = serde_json::from_value(args).map_err(|e| Error::InvalidInput(e.to_string()))?;
        self.0.run(&["commit", "-m", &args.message]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_git_write_gated_by_config() {
        let ctx = GitContext::new(std::env::temp_dir(), Arc::new(Config::default()));
        let result = GitStageAllTool(ctx).execute(json!({})).await.unwrap();
        assert!(!result.success);
    }
}
