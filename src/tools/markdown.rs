//! Markdown heading scan used by the dispatcher's Markdown-file augmentation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext};

use super::filesystem::FsContext;
use super::traits::{Tool, ToolMetadata, ToolResult};

fn scan_headings(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim_start();
            let level = trimmed.chars().take_while(|c| *c == '#').count();
            if level == 0 || level > 6 {
                return None;
            }
            let text = trimmed[level..].trim();
            if text.is_empty() {
                None
            } else {
                Some(format!("{} {}", "#".repeat(level), text))
            }
        })
        .collect()
}

#[derive(Deserialize)]
struct PathArgs {
    path: String,
}

pub struct MarkdownOutlineTool(pub FsContext);

#[async_trait]
impl Tool for MarkdownOutlineTool {
    fn name(&self) -> &str {
        "markdown_outline"
    }
    fn description(&self) -> &str {
        "List the heading outline of a Markdown file"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"path": {"type": "string"}}, "required": ["path"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::Explanation, TaskType::Documentation])
            .with_contexts([ToolContext::Filesystem])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: PathArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        let resolved = self.0.resolve(&args.path)?;
        let content = tokio::fs::read_to_string(&resolved).await?;
        Ok(ToolResult::success(scan_headings(&content).join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_headings_ignores_hashtags_in_body() {
        let source = "# Title\nSome text with a #hashtag that is not a heading continuation wait\n## Section\n";
        let headings = scan_headings(source);
        assert_eq!(headings, vec!["# Title".to_string(), "## Section".to_string()]);
    }
}
