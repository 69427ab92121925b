//! Planning: the three-phase funnel from a human message to a graph
//! transition — a regex pre-planner (Phase 0), a scored quick classifier
//! (Phase 1), and an LLM planner (Phase 2) invoked only when the first two
//! didn't resolve confidently.

pub mod classifier;
pub mod llm_planner;
pub mod preplanner;
pub mod prompt;
mod prompt_builder;

use serde_json::json;

use crate::core::provider::LlmProvider;
use crate::error::Result;
use crate::graph::message::Message;
use crate::graph::state::{AgentState, TaskType};
use crate::graph::Node;
use crate::tools::registry::make_tool_call;
use crate::tools::ToolRegistry;

use preplanner::PreplanOutcome;

const CANNED_GREETING: &str = "Hello! How can I help you with your coding tasks today?";

/// Drive one `Plan` node: try Phase 0, then Phase 1's confident
/// short-circuits, falling through to the Phase 2 LLM planner.
pub async fn run(state: &mut AgentState, provider: &dyn LlmProvider, registry: &ToolRegistry) -> Result<Node> {
    if let Some(outcome) = preplanner::try_preplan(state.latest_human_message()) {
        return Ok(match outcome {
            PreplanOutcome::Respond(text) => {
                state.final_response = Some(text.clone());
                state.messages.push(Message::ai(text));
                Node::End
            }
            PreplanOutcome::ToolCall(call) => {
                state.tool_calls = vec![call];
                Node::Tool
            }
        });
    }

    let classification = classifier::classify(state.latest_human_message());
    let shortcut = classification.may_resolve_without_planner();
    let task_type = classification.task_type;
    let detected_files = classification.detected_files.clone();
    let detected_action = classification.detected_action.clone();
    state.classification = Some(classification);

    if shortcut {
        if let Some(node) = try_classifier_shortcut(state, task_type, &detected_files, detected_action.as_deref()) {
            return Ok(node);
        }
    }

    llm_planner::run(state, provider, registry).await
}

/// Resolve the subset of confident classifications that translate directly
/// to a graph transition without needing a second round of file-op args
/// (copy/move need two paths the classifier doesn't reliably pair up, so
/// those still fall through to the Phase 2 planner).
fn try_classifier_shortcut(
    state: &mut AgentState,
    task_type: TaskType,
    detected_files: &[String],
    detected_action: Option<&str>,
) -> Option<Node> {
    match task_type {
        TaskType::Greeting => {
            state.final_response = Some(CANNED_GREETING.to_string());
            state.messages.push(Message::ai(CANNED_GREETING.to_string()));
            Some(Node::End)
        }
        TaskType::Explanation => {
            let path = detected_files.first()?;
            state.tool_calls = vec![make_tool_call("read_file", json!({"path": path}))];
            Some(Node::Tool)
        }
        TaskType::WebSearch => {
            state.tool_calls = vec![make_tool_call("web_search", json!({"query": state.latest_human_message()}))];
            Some(Node::Tool)
        }
        TaskType::FileOperation => {
            let path = detected_files.first()?;
            let tool_name = match detected_action? {
                "read" => "read_file",
                "delete" => "delete_file",
                _ => return None,
            };
            state.tool_calls = vec![make_tool_call(tool_name, json!({"path": path}))];
            Some(Node::Tool)
        }
        _ => None,
    }
}
