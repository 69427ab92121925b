//! Control-flow meta-tools. These carry no domain logic; their entire
//! purpose is to be recognized by name at the coding/verification loop and
//! router boundaries (`graph::mod::step`, `agents::coding`,
//! `agents::verification`).

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::Result;
use crate::graph::state::{TaskType, ToolContext};

use super::traits::{Tool, ToolMetadata, ToolResult};

#[derive(Deserialize)]
struct ClarifyArgs {
    question: String,
}

/// Asks the user a clarifying question instead of guessing; the coding loop
/// treats this like `done` — it always terminates the current sub-agent.
pub struct ClarifyTool;

#[async_trait]
impl Tool for ClarifyTool {
    fn name(&self) -> &str {
        "clarify"
    }
    fn description(&self) -> &str {
        "Ask the user a clarifying question instead of guessing"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"question": {"type": "string"}}, "required": ["question"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::MetaTool]).with_contexts([ToolContext::Config])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: ClarifyArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        Ok(ToolResult::success(args.question))
    }
}

#[derive(Deserialize)]
struct DoneArgs {
    reasoning: String,
}

/// Declares the run finished. Recognized by name in the coding loop (4.6
/// step 5) and the router (4.8 decision table).
pub struct DoneTool;

#[async_trait]
impl Tool for DoneTool {
    fn name(&self) -> &str {
        "done"
    }
    fn description(&self) -> &str {
        "Declare the task finished and provide the final reasoning"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"reasoning": {"type": "string"}}, "required": ["reasoning"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::MetaTool]).with_contexts([ToolContext::Config])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: DoneArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        Ok(ToolResult::success(args.reasoning))
    }
}

#[derive(Deserialize)]
struct TaskCompleteArgs {
    summary: String,
}

/// Synonym `done` accepts from some prompts; kept distinct so both verbs
/// route the same way without the planner having to pick the "right" one.
pub struct TaskCompleteTool;

#[async_trait]
impl Tool for TaskCompleteTool {
    fn name(&self) -> &str {
        "task_complete"
    }
    fn description(&self) -> &str {
        "Declare the task finished and provide a summary"
    }
    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {"summary": {"type": "string"}}, "required": ["summary"]})
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::MetaTool]).with_contexts([ToolContext::Config])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let args: TaskCompleteArgs = serde_json::from_value(args).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        Ok(ToolResult::success(args.summary))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationResponseArgs {
    pub passed: bool,
    pub reasoning: String,
    #[serde(default)]
    pub expected: Option<String>,
    #[serde(default)]
    pub actual: Option<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// The verification sub-agent's sole terminal call (4.7); the outcome is
/// built by scanning for this call and adopting its structured arguments.
pub struct BuildVerificationResponseTool;

#[async_trait]
impl Tool for BuildVerificationResponseTool {
    fn name(&self) -> &str {
        "build_verification_response"
    }
    fn description(&self) -> &str {
        "Report whether the original request's success criteria were met"
    }
    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "passed": {"type": "boolean"},
                "reasoning": {"type": "string"},
                "expected": {"type": ["string", "null"]},
                "actual": {"type": ["string", "null"]},
                "suggestions": {"type": "array", "items": {"type": "string"}}
            },
            "required": ["passed", "reasoning"]
        })
    }
    fn metadata(&self) -> ToolMetadata {
        ToolMetadata::new().with_scenarios([TaskType::ResultVerification, TaskType::MetaTool]).with_contexts([ToolContext::Config])
    }
    async fn execute(&self, args: Value) -> Result<ToolResult> {
        let parsed: VerificationResponseArgs =
            serde_json::from_value(args.clone()).map_err(|e| crate::Error::InvalidInput(e.to_string()))?;
        Ok(ToolResult::success_with_metadata(parsed.reasoning.clone(), args))
    }
}

/// Parse a `build_verification_response` call's arguments out of its raw
/// JSON string, used by the verification sub-agent to recover its outcome.
pub fn parse_verification_response(raw_arguments: &str) -> Option<VerificationResponseArgs> {
    serde_json::from_str(raw_arguments).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verification_response() {
        let raw = r#"{"passed": true, "reasoning": "tests pass"}"#;
        let parsed = parse_verification_response(raw).unwrap();
        assert!(parsed.passed);
        assert_eq!(parsed.reasoning, "tests pass");
    }

    #[test]
    fn test_parse_verification_response_rejects_garbage() {
        assert!(parse_verification_response("not json").is_none());
    }
}
