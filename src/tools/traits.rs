//! Core tool trait, result type, and the scenario/side-effect metadata that
//! lets the registry scope tool sets per sub-agent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::provider::{FunctionDefinition, ToolDefinition};
use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext, ToolGuard, ToolSideEffect};

/// Declarative metadata a tool attaches to itself; mirrors the decorator
/// annotations (`tool_scenarios`, `tool_side_effects`, `tool_contexts`,
/// `tool_guards`) from the tool registry this crate's design is based on.
#[derive(Debug, Clone, Default)]
pub struct ToolMetadata {
    pub scenarios: Vec<TaskType>,
    pub side_effects: Vec<ToolSideEffect>,
    pub contexts: Vec<ToolContext>,
    pub guards: Vec<ToolGuard>,
}

impl ToolMetadata {
    pub fn new() -> Self {
        ToolMetadata::default()
    }

    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = TaskType>) -> Self {
        self.scenarios = scenarios.into_iter().collect();
        self
    }

    pub fn with_side_effects(mut self, effects: impl IntoIterator<Item = ToolSideEffect>) -> Self {
        self.side_effects = effects.into_iter().collect();
        self
    }

    pub fn with_contexts(mut self, contexts: impl IntoIterator<Item = ToolContext>) -> Self {
        self.contexts = contexts.into_iter().collect();
        self
    }

    pub fn with_guards(mut self, guards: impl IntoIterator<Item = ToolGuard>) -> Self {
        self.guards = guards.into_iter().collect();
        self
    }

    pub fn is_read_only(&self) -> bool {
        !self.side_effects.contains(&ToolSideEffect::FileMutation)
            && !self.side_effects.contains(&ToolSideEffect::StateChange)
    }
}

/// A tool that can be called by the LLM or the textual pre-planner.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name, as referenced in tool calls.
    fn name(&self) -> &str;

    /// One-line summary surfaced in the schema and in planning prompts.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's user-facing parameters (internal
    /// parameters such as `root`/`state`/`config` are never part of this).
    fn parameters_schema(&self) -> Value;

    /// Declarative scenario/side-effect/context/guard metadata.
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::default()
    }

    /// Execute the tool with already-resolved, already-sandboxed arguments.
    async fn execute(&self, args: Value) -> Result<ToolResult>;

    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: self.name().to_string(),
                description: self.description().to_string(),
                parameters: self.parameters_schema(),
            },
        }
    }
}

/// Result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub content: Option<String>,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        ToolResult { success: true, content: Some(content.into()), error: None, metadata: None }
    }

    pub fn success_with_metadata(content: impl Into<String>, metadata: Value) -> Self {
        ToolResult { success: true, content: Some(content.into()), error: None, metadata: Some(metadata) }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ToolResult { success: false, content: None, error: Some(error.into()), metadata: None }
    }

    /// Render for inclusion in a `Message::Tool` for the LLM.
    pub fn to_display_string(&self) -> String {
        if self.success {
            self.content.clone().unwrap_or_default()
        } else {
            format!("Error: {}", self.error.clone().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success_and_failure() {
        let success = ToolResult::success("Done!");
        assert!(success.success);
        assert_eq!(success.content.as_deref(), Some("Done!"));

        let failure = ToolResult::failure("Oops!");
        assert!(!failure.success);
        assert_eq!(failure.error.as_deref(), Some("Oops!"));
    }

    #[test]
    fn test_metadata_read_only_detection() {
        let meta = ToolMetadata::new().with_side_effects([ToolSideEffect::Network]);
        assert!(meta.is_read_only());

        let mutating = ToolMetadata::new().with_side_effects([ToolSideEffect::FileMutation]);
        assert!(!mutating.is_read_only());
    }
}
