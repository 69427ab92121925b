//! Python import scanning used by the dispatcher's augmentation step.
//!
//! A narrowed stand-in for a full AST walk: line-based regex matching of
//! `import x` / `from x import y`, sufficient to list a file's declared
//! dependencies without needing a Python parser in the dependency tree.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext};

use super::filesystem::FsContext;
use super::traits::{Tool, ToolMetadata, ToolResult};

static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*import\s+([\w.]+)").unwrap());
static FROM_IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*from\s+([\w.]+)\s+import\s+(.+)").unwrap());

fn scan_imports(source: &str) -> Vec<String> {
    let mut modules = Vec::new();
    for line in source.lines() {
        if let Some(caps) = IMPORT_RE.captures(line) {
            modules.push(caps[1].to_string());
        } else if let Some(caps) = FROM_IMPORT_RE.captures(line) {
            modules.push(caps[1].to_string());
        }
    }
    modules.sort();
    modules.dedup();
    modules
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

pub struct PythonAstDependenciesTool(pub FsContext);

#[async_trait]
impl Tool for PythonAstDependenciesTool {
    fn name(&self) -> &str {
        "python_ast_dependencies"
    }
    fn description(&self) -> &str {
        "List the modules a Python file imports"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::CodeAnalysis, TaskType::Explanation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        Ok(ToolResult::success(scan_imports(&content).join("\n")))
    }
}

#[derive(Deserialize)]
struct PathsArgs {
    paths: Vec<String>,
}

pub struct PythonAstDependenciesMultifileTool(pub FsContext);

#[async_trait]
impl Tool for PythonAstDependenciesMultifileTool {
    fn name(&self) -> &str {
        "python_ast_dependencies_multifile"
    }
    fn description(&self) -> &str {
        "List the modules imported across several Python files"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"paths": {"type": "array", "items": {"type": "string"}}}, "required": ["paths"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::CodeAnalysis, TaskType::ComplexRefactor])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathsArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let mut chunks = Vec::new();
        for path in &args.paths {
            let resolved = self.0.resolve(path)?;
            let content = tokio::fs::read_to_string(&resolved).await?;
            chunks.push(format!("{}: {}", path, scan_imports(&content).join(", ")));
        }
        Ok(ToolResult::success(chunks.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_imports_plain_and_from() {
        let source = "import os\nfrom pathlib import Path\nimport sys, re\n";
        let modules = scan_imports(source);
        assert!(modules.contains(&"os".to_string()));
        assert!(modules.contains(&"pathlib".to_string()));
    }
}
