//! Filesystem tools: read/write/copy/move/delete/list/find/grep.
//!
//! Every tool here receives its workspace root and policy at construction
//! time; the dispatcher applies the secret and test-overwrite guards before
//! `execute` is ever called, so these implementations only resolve paths
//! and perform the operation.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext, ToolSideEffect};

use super::sandbox_guard::resolve_path;
use super::traits::{Tool, ToolMetadata, ToolResult};

/// Ambient values every filesystem tool needs but that are hidden from the
/// LLM-visible parameter schema.
#[derive(Clone)]
pub struct FsContext {
    pub root: PathBuf,
    pub config: Arc<Config>,
}

impl FsContext {
    pub fn new(root: PathBuf, config: Arc<Config>) -> Self {
        FsContext { root, config }
    }

    pub(crate) fn resolve(&self, path: &str) -> Result<PathBuf> {
        resolve_path(path, &self.root, self.config.runtime.allow_outside_workspace)
    }
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

#[derive(Deserialize)]
struct CopyMoveArgs {
    source: String,
    destination: String,
}

#[derive(Deserialize)]
struct WriteArgs {
    path: String,
    content: String,
}

pub struct ReadFileTool(pub FsContext);

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }
    fn description(&self) -> &str {
        "Read the full contents of a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation, TaskType::Explanation, TaskType::CodeAnalysis])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("read_file: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => Ok(ToolResult::success(content)),
            Err(e) => Ok(ToolResult::failure(format!("could not read {}: {}", args.path, e))),
        }
    }
}

pub struct WriteFileTool(pub FsContext);

#[async_trait]
impl Tool for WriteFileTool {
    fn name(&self) -> &str {
        "write_file"
    }
    fn description(&self) -> &str {
        "Write content to a workspace file, creating or overwriting it"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "content": {"type": "string"}}, "required": ["path", "content"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation, TaskType::CodeFix, TaskType::CodeGeneration])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
            .with_guards([crate::graph::state::ToolGuard::TestOverwrite])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: WriteArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("write_file: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        tokio::fs::write(&resolved, &args.content).await?;
        Ok(ToolResult::success(format!("wrote {} bytes to {}", args.content.len(), args.path)))
    }
}

pub struct AppendFileTool(pub FsContext);

#[async_trait]
impl Tool for AppendFileTool {
    fn name(&self) -> &str {
        "append_file"
    }
    fn description(&self) -> &str {
        "Append content to the end of a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "content": {"type": "string"}}, "required": ["path", "content"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        use tokio::io::AsyncWriteExt;
        let args: WriteArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("append_file: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(&resolved).await?;
        file.write_all(args.content.as_bytes()).await?;
        Ok(ToolResult::success(format!("appended {} bytes to {}", args.content.len(), args.path)))
    }
}

pub struct CopyFileTool(pub FsContext);

#[async_trait]
impl Tool for CopyFileTool {
    fn name(&self) -> &str {
        "copy_file"
    }
    fn description(&self) -> &str {
        "Copy a workspace file to another workspace path"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"source": {"type": "string"}, "destination": {"type": "string"}}, "required": ["source", "destination"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: CopyMoveArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("copy_file: {}", e)))?;
        let source = self.0.resolve(&args.source)?;
        let destination = self.0.resolve(&args.destination)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        tokio::fs::copy(&source, &destination).await?;
        Ok(ToolResult::success(format!("copied {} to {}", args.source, args.destination)))
    }
}

pub struct MoveFileTool(pub FsContext);

#[async_trait]
impl Tool for MoveFileTool {
    fn name(&self) -> &str {
        "move_file"
    }
    fn description(&self) -> &str {
        "Move (rename) a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"source": {"type": "string"}, "destination": {"type": "string"}}, "required": ["source", "destination"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: CopyMoveArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("move_file: {}", e)))?;
        let source = self.0.resolve(&args.source)?;
        let destination = self.0.resolve(&args.destination)?;
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.ok();
        }
        tokio::fs::rename(&source, &destination).await?;
        Ok(ToolResult::success(format!("moved {} to {}", args.source, args.destination)))
    }
}

pub struct DeleteFileTool(pub FsContext);

#[async_trait]
impl Tool for DeleteFileTool {
    fn name(&self) -> &str {
        "delete_file"
    }
    fn description(&self) -> &str {
        "Delete a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("delete_file: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        tokio::fs::remove_file(&resolved).await?;
        Ok(ToolResult::success(format!("deleted {}", args.path)))
    }
}

#[derive(Deserialize)]
struct ReadFilesArgs {
    paths: Vec<String>,
}

pub struct ReadFilesTool(pub FsContext);

#[async_trait]
impl Tool for ReadFilesTool {
    fn name(&self) -> &str {
        "read_files"
    }
    fn description(&self) -> &str {
        "Read several workspace files in one call"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"paths": {"type": "array", "items": {"type": "string"}}}, "required": ["paths"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::FileOperation, TaskType::Explanation, TaskType::CodeAnalysis])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: ReadFilesArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("read_files: {}", e)))?;
        let mut chunks = Vec::new();
        for path in &args.paths {
            let resolved = self.0.resolve(path)?;
            match tokio::fs::read_to_string(&resolved).await {
                Ok(content) => chunks.push(format!("--- {} ---\n{}", path, content)),
                Err(e) => chunks.push(format!("--- {} ---\n<error: {}>", path, e)),
            }
        }
        Ok(ToolResult::success(chunks.join("\n\n")))
    }
}

#[derive(Deserialize)]
struct ReplaceInFileArgs {
    path: String,
    find: String,
    replace: String,
}

pub struct ReplaceInFileTool(pub FsContext);

#[async_trait]
impl Tool for ReplaceInFileTool {
    fn name(&self) -> &str {
        "replace_in_file"
    }
    fn description(&self) -> &str {
        "Replace the first occurrence of a substring in a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}, "find": {"type": "string"}, "replace": {"type": "string"}}, "required": ["path", "find", "replace"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::CodeFix, TaskType::FileOperation])
            .with_side_effects([ToolSideEffect::FileMutation])
            .with_contexts([ToolContext::Filesystem])
            .with_guards([crate::graph::state::ToolGuard::TestOverwrite])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: ReplaceInFileArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("replace_in_file: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        if let Some(pos) = content.find(&args.find) {
            let mut updated = content[..pos].to_string();
            updated.push_str(&args.replace);
            updated.push_str(&content[pos + args.find.len()..]);
            tokio::fs::write(&resolved, &updated).await?;
            Ok(ToolResult::success(format!("replaced 1 occurrence in {}", args.path)))
        } else {
            Ok(ToolResult::failure(format!("pattern not found in {}", args.path)))
        }
    }
}

pub struct LineCountTool(pub FsContext);

#[async_trait]
impl Tool for LineCountTool {
    fn name(&self) -> &str {
        "line_count"
    }
    fn description(&self) -> &str {
        "Count the number of lines in a workspace file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation]).with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("line_count: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        Ok(ToolResult::success(content.lines().count().to_string()))
    }
}

#[derive(Deserialize)]
struct ListFilesArgs {
    #[serde(default = "default_dot")]
    path: String,
}

fn default_dot() -> String {
    ".".to_string()
}

pub struct ListFilesTool(pub FsContext);

#[async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }
    fn description(&self) -> &str {
        "List files under a workspace directory, honoring ignore rules"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation, TaskType::CodeAnalysis]).with_contexts([ToolContext::Search])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: ListFilesArgs = serde_json::from_value(args).unwrap_or(ListFilesArgs { path: default_dot() });
        let resolved = self.0.resolve(&args.path)?;
        let files = walk_files(&resolved, &self.0.config.tools);
        Ok(ToolResult::success(files.join("\n")))
    }
}

#[derive(Deserialize)]
struct FindFilesArgs {
    pattern: String,
}

pub struct FindFilesTool(pub FsContext);

#[async_trait]
impl Tool for FindFilesTool {
    fn name(&self) -> &str {
        "find_files"
    }
    fn description(&self) -> &str {
        "Find workspace files whose name matches a glob pattern"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"pattern": {"type": "string"}}, "required": ["pattern"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation, TaskType::CodeAnalysis]).with_contexts([ToolContext::Search])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: FindFilesArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("find_files: {}", e)))?;
        let glob = globset::Glob::new(&args.pattern)
            .map_err(|e| crate::Error::InvalidInput(format!("invalid pattern: {}", e)))?
            .compile_matcher();
        let files = walk_files(&self.0.root, &self.0.config.tools)
            .into_iter()
            .filter(|f| glob.is_match(f))
            .collect::<Vec<_>>();
        Ok(ToolResult::success(files.join("\n")))
    }
}

#[derive(Deserialize)]
struct GrepArgs {
    pattern: String,
    path: String,
}

pub struct GrepFilesTool(pub FsContext);

#[async_trait]
impl Tool for GrepFilesTool {
    fn name(&self) -> &str {
        "grep_files"
    }
    fn description(&self) -> &str {
        "Search workspace files under a path for a regular expression"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"pattern": {"type": "string"}, "path": {"type": "string"}}, "required": ["pattern", "path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::FileOperation, TaskType::CodeAnalysis]).with_contexts([ToolContext::Search])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: GrepArgs = serde_json::from_value(args)
            .map_err(|e| crate::Error::InvalidInput(format!("grep_files: {}", e)))?;
        let re = regex::Regex::new(&args.pattern)
            .map_err(|e| crate::Error::InvalidInput(format!("invalid regex: {}", e)))?;
        let resolved = self.0.resolve(&args.path)?;
        let mut matches = Vec::new();
        for file in walk_files(&resolved, &self.0.config.tools) {
            let full = self.0.root.join(&file);
            if let Ok(content) = tokio::fs::read_to_string(&full).await {
                for (lineno, line) in content.lines().enumerate() {
                    if re.is_match(line) {
                        matches.push(format!("{}:{}:{}", file, lineno + 1, line.trim()));
                    }
                }
            }
        }
        Ok(ToolResult::success(matches.join("\n")))
    }
}

fn walk_files(root: &PathBuf, policy: &crate::config::ToolsConfig) -> Vec<String> {
    let mut builder = ignore::WalkBuilder::new(root);
    builder.hidden(!policy.include_hidden_files).git_ignore(policy.respect_gitignore);
    for dir in &policy.exclude_dirs {
        let dir = dir.clone();
        builder.filter_entry(move |entry| entry.file_name().to_str() != Some(dir.as_str()));
    }
    let mut files = Vec::new();
    for entry in builder.build().flatten() {
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            if let Ok(relative) = entry.path().strip_prefix(root) {
                files.push(relative.display().to_string());
            }
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn ctx(root: PathBuf) -> FsContext {
        FsContext::new(root, Arc::new(Config::default()))
    }

    #[tokio::test]
    async fn test_write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let fs = ctx(dir.path().to_path_buf());
        let write = WriteFileTool(fs.clone());
        write.execute(json!({"path": "a.txt", "content": "hello"})).await.unwrap();

        let read = ReadFileTool(fs);
        let result = read.execute(json!({"path": "a.txt"})).await.unwrap();
        assert_eq!(result.content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_copy_file() {
        let dir = tempdir().unwrap();
        let fs = ctx(dir.path().to_path_buf());
        WriteFileTool(fs.clone()).execute(json!({"path": "a.txt", "content": "x"})).await.unwrap();
        let result = CopyFileTool(fs.clone()).execute(json!({"source": "a.txt", "destination": "b.txt"})).await.unwrap();
        assert!(result.success);
        assert!(dir.path().join("b.txt").exists());
    }

    #[tokio::test]
    async fn test_list_files_excludes_git_dir() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".git").join("HEAD"), "ref").unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        let fs = ctx(dir.path().to_path_buf());
        let result = ListFilesTool(fs).execute(json!({})).await.unwrap();
        let content = result.content.unwrap();
        assert!(content.contains("main.rs"));
        assert!(!content.contains("HEAD"));
    }
}
