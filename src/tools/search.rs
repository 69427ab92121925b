//! Web search: contract-only, delegating to an injected `SearchBackend` so
//! no specific search API is hard-wired into this crate.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext, ToolSideEffect};

use super::traits::{Tool, ToolMetadata, ToolResult};

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

#[derive(Deserialize)]
struct QueryArgs {
    query: String,
}

pub struct WebSearchTool {
    pub backend: Option<Arc<dyn SearchBackend>>,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }
    fn description(&self) -> &str {
        "Search the web for up-to-date information"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"query": {"type": "string"}}, "required": ["query"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new()
            .with_scenarios([TaskType::WebSearch])
            .with_side_effects([ToolSideEffect::Network])
            .with_contexts([ToolContext::Search])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: QueryArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        match &self.backend {
            Some(backend) => match backend.search(&args.query).await {
                Ok(results) => Ok(ToolResult::success(results.join("\n"))),
                Err(e) => Ok(ToolResult::failure(e.to_string())),
            },
            None => Ok(ToolResult::failure("no web-search backend configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_web_search_without_backend_fails_clearly() {
        let tool = WebSearchTool { backend: None };
        let result = tool.execute(json!({"query": "rust async traits"})).await.unwrap();
        assert!(!result.success);
    }
}
