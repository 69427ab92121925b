//! Tool registry: enumerates every callable tool and scopes tool sets for
//! sub-agents by `TaskType`/`ToolSideEffect`.

use std::collections::HashMap;

use crate::core::provider::{FunctionCall, ToolCall, ToolDefinition};
use crate::error::Result;
use crate::graph::state::{TaskType, ToolSideEffect};

use super::traits::{Tool, ToolMetadata, ToolResult};

pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry { tools: HashMap::new() }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Scope a tool set down to those relevant to `task_types`, optionally
    /// keeping tools with no scenario annotation at all, excluding any tool
    /// tagged with one of `exclude_task_types`, and excluding any tool whose
    /// side effects intersect `exclude_side_effects`.
    pub fn list_tools_for_tasks(
        &self,
        task_types: &[TaskType],
        include_unannotated: bool,
        exclude_task_types: &[TaskType],
        exclude_side_effects: &[ToolSideEffect],
    ) -> Vec<&dyn Tool> {
        self.tools
            .values()
            .map(|t| t.as_ref())
            .filter(|tool| {
                let meta = tool.metadata();
                if meta.scenarios.iter().any(|s| exclude_task_types.contains(s)) {
                    return false;
                }
                if meta.side_effects.iter().any(|e| exclude_side_effects.contains(e)) {
                    return false;
                }
                if meta.scenarios.is_empty() {
                    return include_unannotated;
                }
                meta.scenarios.iter().any(|s| task_types.contains(s))
            })
            .collect()
    }

    pub fn definitions_for_tasks(
        &self,
        task_types: &[TaskType],
        include_unannotated: bool,
        exclude_task_types: &[TaskType],
        exclude_side_effects: &[ToolSideEffect],
    ) -> Vec<ToolDefinition> {
        self.list_tools_for_tasks(task_types, include_unannotated, exclude_task_types, exclude_side_effects)
            .into_iter()
            .map(|t| t.to_definition())
            .collect()
    }

    pub fn metadata_of(&self, name: &str) -> Option<ToolMetadata> {
        self.get(name).map(|t| t.metadata())
    }

    /// Execute one tool call, resolving by name and parsing its JSON args.
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let args: serde_json::Value = serde_json::from_str(&call.function.arguments).unwrap_or(serde_json::Value::Null);
        match self.get(&call.function.name) {
            Some(tool) => tool.execute(args).await,
            None => Ok(ToolResult::failure(format!("Unknown tool: {}", call.function.name))),
        }
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

/// Build a `ToolCall` with string-encoded JSON arguments, as produced by the
/// pre-planner and by dispatcher augmentation steps.
pub fn make_tool_call(name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        call_type: "function".to_string(),
        function: FunctionCall { name: name.to_string(), arguments: args.to_string() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes its input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            json!({"type": "object", "properties": {}})
        }
        fn metadata(&self) -> ToolMetadata {
            ToolMetadata::new().with_scenarios([TaskType::FileOperation])
        }
        async fn execute(&self, _args: serde_json::Value) -> Result<ToolResult> {
            Ok(ToolResult::success("echo"))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        assert_eq!(registry.count(), 1);
        assert!(registry.get("echo").is_some());
    }

    #[test]
    fn test_scoped_tools_respect_scenario_filter() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let scoped = registry.list_tools_for_tasks(&[TaskType::FileOperation], false, &[], &[]);
        assert_eq!(scoped.len(), 1);
        let empty = registry.list_tools_for_tasks(&[TaskType::CodeFix], false, &[], &[]);
        assert!(empty.is_empty());
    }

    #[tokio::test]
    async fn test_execute_unknown_tool_is_a_failure_result_not_an_error() {
        let registry = ToolRegistry::new();
        let call = make_tool_call("nonexistent", json!({}));
        let result = registry.execute(&call).await.unwrap();
        assert!(!result.success);
    }
}
