//! Router / review node: inspects the last outcome and tool output and
//! decides which node runs next, per the decision table this crate drives
//! every run's `Review` transition from.

use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::graph::message::Message;
use crate::graph::state::{AgentOutcome, AgentState, OutcomeStatus};
use crate::graph::Node;
use crate::tools::meta::parse_verification_response;

/// Decide the next node after a `Tool`/`Coding`/`Verification` pass.
pub fn run(state: &mut AgentState) -> Result<Node> {
    if state.iterations > state.config.runtime.max_iterations {
        finish_with(state, "Reached the maximum number of planning iterations.".to_string());
        return Ok(Node::End);
    }

    if let Some(hash) = stuck_error_hash(state) {
        let seen_before = !state.error_hashes.insert(hash);
        if seen_before {
            finish_with(state, "The same error recurred across iterations; stopping to avoid an infinite loop.".to_string());
            return Ok(Node::End);
        }
    }

    if let Some((name, content)) = last_tool_message(state) {
        if name == "done" {
            finish_with(state, content);
            return Ok(Node::End);
        }
        if name == "build_verification_response" {
            if let Some(raw_args) = last_tool_call_args(state, &name) {
                if let Some(verdict) = parse_verification_response(&raw_args) {
                    if verdict.passed {
                        finish_with(state, verdict.reasoning);
                        return Ok(Node::End);
                    }
                    state.verification_loops += 1;
                    if state.verification_loops > 1 {
                        return Ok(Node::Coding);
                    }
                    return Ok(Node::Verification);
                }
            }
        }
    }

    match state.last_agent_outcome() {
        Some(outcome) if outcome.agent == "tools" => {
            if let Some(agent) = state.selected_agent.clone() {
                if agent != "tools" {
                    return Ok(Node::Delegate);
                }
            }
            Ok(Node::Plan)
        }
        Some(outcome) if outcome.agent == "coding" => Ok(Node::Verification),
        Some(outcome) if outcome.agent == "verification" => {
            if outcome.status == OutcomeStatus::Failed && state.iterations < state.config.runtime.max_iterations {
                if let Some(suggestion) = outcome.next_step_suggestion.clone() {
                    state.messages.push(Message::system(format!("Verification suggested: {suggestion}")));
                }
                Ok(Node::Plan)
            } else {
                finish_with(state, outcome.result.clone());
                Ok(Node::End)
            }
        }
        _ => {
            if state.final_response.is_none() {
                finish_with(state, "No further action available.".to_string());
            }
            Ok(Node::End)
        }
    }
}

fn finish_with(state: &mut AgentState, text: String) {
    if state.final_response.is_none() {
        state.final_response = Some(text);
    }
}

fn last_tool_message(state: &AgentState) -> Option<(String, String)> {
    match state.messages.last() {
        Some(Message::Tool { name, content, .. }) => Some((name.clone(), content.clone())),
        _ => None,
    }
}

fn last_tool_call_args(state: &AgentState, name: &str) -> Option<String> {
    state
        .messages
        .iter()
        .rev()
        .find_map(|m| m.tool_calls().and_then(|calls| calls.iter().find(|c| c.function.name == name)))
        .map(|c| c.function.arguments.clone())
}

/// Hash (tool name, error text) for the last failed tool call, as a stand-in
/// for the (error kind, path, line) triple when a tool's failure has no
/// further structure to key on.
fn stuck_error_hash(state: &AgentState) -> Option<[u8; 32]> {
    let Message::Tool { name, content, .. } = state.messages.last()? else { return None };
    if !content.starts_with("Error:") {
        return None;
    }
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(content.as_bytes());
    Some(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::core::provider::{FunctionCall, ToolCall};

    fn new_state() -> AgentState {
        AgentState::new("fix the bug", Arc::new(Config::default()))
    }

    #[test]
    fn test_max_iterations_ends() {
        let mut state = new_state();
        state.iterations = state.config.runtime.max_iterations + 1;
        let node = run(&mut state).unwrap();
        assert_eq!(node, Node::End);
        assert!(state.final_response.is_some());
    }

    #[test]
    fn test_done_tool_ends_with_reasoning() {
        let mut state = new_state();
        state.messages.push(Message::tool("call-1", "done", "all set"));
        let node = run(&mut state).unwrap();
        assert_eq!(node, Node::End);
        assert_eq!(state.final_response.as_deref(), Some("all set"));
    }

    #[test]
    fn test_verification_failure_loops_back_to_plan() {
        let mut state = new_state();
        let call = ToolCall {
            id: "call-1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "build_verification_response".to_string(),
                arguments: r#"{"passed":false,"reasoning":"tests fail","suggestions":["check imports"]}"#.to_string(),
            },
        };
        state.messages.push(Message::ai_with_tool_calls(String::new(), vec![call]));
        state.messages.push(Message::tool("call-1", "build_verification_response", "tests fail"));
        let node = run(&mut state).unwrap();
        assert_eq!(node, Node::Verification);
        assert_eq!(state.verification_loops, 1);
    }

    #[test]
    fn test_verification_pass_ends() {
        let mut state = new_state();
        let call = ToolCall {
            id: "call-1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "build_verification_response".to_string(),
                arguments: r#"{"passed":true,"reasoning":"looks good"}"#.to_string(),
            },
        };
        state.messages.push(Message::ai_with_tool_calls(String::new(), vec![call]));
        state.messages.push(Message::tool("call-1", "build_verification_response", "looks good"));
        let node = run(&mut state).unwrap();
        assert_eq!(node, Node::End);
        assert_eq!(state.final_response.as_deref(), Some("looks good"));
    }

    #[test]
    fn test_repeated_tool_error_collapses_to_end() {
        let mut state = new_state();
        state.messages.push(Message::tool("call-1", "run_pytest", "Error: ModuleNotFoundError at foo.py:3"));
        state.agent_outcomes.push(AgentOutcome {
            agent: "tools".to_string(),
            status: OutcomeStatus::Failed,
            result: "Error: ModuleNotFoundError at foo.py:3".to_string(),
            messages: Vec::new(),
            next_step_suggestion: None,
        });
        let first = run(&mut state).unwrap();
        assert_ne!(first, Node::End);

        state.messages.push(Message::tool("call-2", "run_pytest", "Error: ModuleNotFoundError at foo.py:3"));
        let second = run(&mut state).unwrap();
        assert_eq!(second, Node::End);
    }
}
