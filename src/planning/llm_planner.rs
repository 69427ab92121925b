//! Phase 2: LLM planner. Builds the planning prompt, calls the LLM in
//! JSON-mode, recovers a structured decision, and retries when the decision
//! looks wrong for the request.

use std::sync::LazyLock;
use std::time::Duration;

use backoff::{future::retry, Error as BackoffError, ExponentialBackoff};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::provider::{GenerationOptions, LlmProvider, LlmResponse};
use crate::error::{Error, Result};
use crate::graph::message::Message;
use crate::graph::state::{AgentState, ClassificationResult};
use crate::graph::Node;
use crate::tools::registry::make_tool_call;
use crate::tools::ToolRegistry;

use super::prompt::build_planning_prompt;

/// One `tool_calls` entry in a planner decision.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlannerToolCallSpec {
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

/// The structured decision the planner recovers from the LLM's JSON output.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlannerDecision {
    pub action: String,
    #[serde(default)]
    pub agent: Option<String>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub tool_calls: Vec<PlannerToolCallSpec>,
}

/// Tool names the mutation-intent retry recognizes as actually changing
/// something, as opposed to only reading or reporting.
const MUTATING_TOOLS: &[&str] = &[
    "write_file",
    "append_file",
    "replace_in_file",
    "delete_file",
    "copy_file",
    "move_file",
    "copy_file_to_dir",
    "move_file_to_dir",
    "write_json",
    "set_json_value",
    "write_yaml",
    "set_yaml_value",
    "write_ini",
    "set_ini_value",
    "inject_function",
    "replace_function",
    "replace_class",
    "replace_method",
    "replace_file_content",
    "rope_rename_symbol",
    "rope_move_module",
    "rope_extract_method",
];

static MUTATION_INTENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(fix|edit|update|change|modify|refactor|bug|issue)\b").unwrap());

static JSON_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Run Phase 2: build the prompt, call the LLM with profile fallback and
/// backoff, recover a decision (with one corrective retry on parse failure
/// and one on a missed mutation intent), and translate it into a graph node.
pub async fn run(state: &mut AgentState, provider: &dyn LlmProvider, registry: &ToolRegistry) -> Result<Node> {
    let classification = state.classification.clone().unwrap_or_else(|| super::classifier::classify(state.latest_human_message()));
    let default_agent = state.config.agents.preferences.default_agent.clone();
    let other_tool_names: Vec<String> = registry.names().into_iter().map(|s| s.to_string()).collect();
    let system_prompt = build_planning_prompt(&classification, &default_agent, &other_tool_names);

    let mut messages = vec![Message::system(system_prompt)];
    messages.extend(state.messages.clone());

    let response = call_with_fallback(provider, &messages, state).await?;
    let mut decision = parse_decision(&response.content);

    if decision.is_none() {
        let mut retry_messages = messages.clone();
        retry_messages.push(Message::ai(response.content.clone()));
        retry_messages.push(Message::human(
            "That response was not valid JSON. Reply again with exactly one JSON object matching the decision schema and nothing else.",
        ));
        if let Ok(retry_response) = call_with_fallback(provider, &retry_messages, state).await {
            decision = parse_decision(&retry_response.content);
        }
    }

    let Some(mut decision) = decision else {
        state.selected_agent = Some(default_agent);
        return Ok(Node::Delegate);
    };

    if looks_like_mutation_request(state.latest_human_message(), &classification) && !decision_has_mutating_call(&decision) {
        let mut retry_messages = messages.clone();
        retry_messages.push(Message::ai(response.content.clone()));
        retry_messages.push(Message::human(
            "The request asks to change a file. Reply again with a tool_calls entry using a tool that actually edits it.",
        ));
        if let Ok(retry_response) = call_with_fallback(provider, &retry_messages, state).await {
            if let Some(retried) = parse_decision(&retry_response.content) {
                decision = retried;
            }
        }
    }

    apply_decision(state, decision, &default_agent)
}

fn looks_like_mutation_request(message: &str, classification: &ClassificationResult) -> bool {
    MUTATION_INTENT_RE.is_match(message) && !classification.detected_files.is_empty()
}

fn decision_has_mutating_call(decision: &PlannerDecision) -> bool {
    decision.action == "tool" && decision.tool_calls.iter().any(|c| MUTATING_TOOLS.contains(&c.tool.as_str()))
}

fn apply_decision(state: &mut AgentState, decision: PlannerDecision, default_agent: &str) -> Result<Node> {
    match decision.action.as_str() {
        "respond" => {
            let text = decision.response.unwrap_or(decision.reasoning);
            state.final_response = Some(text.clone());
            state.messages.push(Message::ai(text));
            Ok(Node::End)
        }
        "done" => {
            state.final_response = Some(decision.reasoning.clone());
            state.messages.push(Message::ai(decision.reasoning));
            Ok(Node::End)
        }
        "tool" => {
            let calls: Vec<_> = decision.tool_calls.into_iter().map(|spec| make_tool_call(&spec.tool, spec.args)).collect();
            if calls.is_empty() {
                state.selected_agent = Some(default_agent.to_string());
                Ok(Node::Delegate)
            } else {
                state.tool_calls = calls;
                Ok(Node::Tool)
            }
        }
        _ => {
            state.selected_agent = Some(decision.agent.unwrap_or_else(|| default_agent.to_string()));
            Ok(Node::Delegate)
        }
    }
}

/// Recover a `PlannerDecision` from raw LLM output: parse as-is, then the
/// first-`{`-to-last-`}` slice, then the longest greedy `{...}` match.
fn parse_decision(raw: &str) -> Option<PlannerDecision> {
    if let Ok(decision) = serde_json::from_str(raw) {
        return Some(decision);
    }
    if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
        if end > start {
            if let Ok(decision) = serde_json::from_str(&raw[start..=end]) {
                return Some(decision);
            }
        }
    }
    JSON_BLOCK_RE.find(raw).and_then(|m| serde_json::from_str(m.as_str()).ok())
}

/// Call the LLM, trying `default_profile` then each
/// `runtime.planner_fallback_profiles` entry in order, retrying transient
/// errors within a profile with exponential backoff before moving on.
async fn call_with_fallback(provider: &dyn LlmProvider, messages: &[Message], state: &mut AgentState) -> Result<LlmResponse> {
    let config = state.config.clone();
    let mut profile_names = vec![config.llm.default_profile.clone()];
    profile_names.extend(config.runtime.planner_fallback_profiles.iter().cloned());

    let mut last_err: Option<Error> = None;
    for profile_name in &profile_names {
        let profile = config.llm.profiles.get(profile_name);
        let model = profile.map(|p| p.model.clone());
        let temperature = profile.and_then(|p| p.temperature).unwrap_or(config.llm.planning_temperature);
        let options = GenerationOptions { model, temperature: Some(temperature), ..Default::default() };

        match call_with_backoff(provider, messages, &options, state).await {
            Ok(response) => return Ok(response),
            Err(e) => {
                last_err = Some(e);
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| Error::PlanningDecision("no LLM profile available".to_string())))
}

async fn call_with_backoff(
    provider: &dyn LlmProvider,
    messages: &[Message],
    options: &GenerationOptions,
    state: &mut AgentState,
) -> Result<LlmResponse> {
    let backoff = ExponentialBackoff {
        initial_interval: Duration::from_millis(500),
        multiplier: 2.0,
        max_elapsed_time: Some(Duration::from_secs(10)),
        ..ExponentialBackoff::default()
    };

    let mut attempts: u32 = 0;
    retry(backoff, || async {
        attempts += 1;
        state.check_llm_budget().map_err(BackoffError::permanent)?;
        state.record_llm_call();
        match provider.generate(messages, options).await {
            Ok(response) => Ok(response),
            Err(e) if e.is_retryable() && attempts < 3 => Err(BackoffError::transient(e)),
            Err(e) => Err(BackoffError::permanent(e)),
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decision_plain_json() {
        let raw = r#"{"action":"respond","reasoning":"hi","response":"Hello!"}"#;
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.action, "respond");
    }

    #[test]
    fn test_parse_decision_recovers_from_surrounding_prose() {
        let raw = "Sure, here is my decision:\n{\"action\":\"tool\",\"reasoning\":\"ok\",\"tool_calls\":[{\"tool\":\"read_file\",\"args\":{\"path\":\"a.py\"}}]}\nLet me know if that helps.";
        let decision = parse_decision(raw).unwrap();
        assert_eq!(decision.action, "tool");
        assert_eq!(decision.tool_calls[0].tool, "read_file");
    }

    #[test]
    fn test_parse_decision_rejects_garbage() {
        assert!(parse_decision("not json at all").is_none());
    }

    #[test]
    fn test_mutation_intent_detection() {
        let classification = ClassificationResult {
            task_type: crate::graph::state::TaskType::CodeFix,
            confidence: 0.9,
            detected_files: vec!["main.py".to_string()],
            detected_action: None,
            reasoning: String::new(),
            candidates: Vec::new(),
        };
        assert!(looks_like_mutation_request("please fix the bug in main.py", &classification));
        assert!(!looks_like_mutation_request("what does main.py do?", &classification));
    }

    #[test]
    fn test_decision_has_mutating_call_detection() {
        let decision = PlannerDecision {
            action: "tool".to_string(),
            agent: None,
            reasoning: String::new(),
            response: None,
            tool_calls: vec![PlannerToolCallSpec { tool: "write_file".to_string(), args: Value::Null }],
        };
        assert!(decision_has_mutating_call(&decision));
    }
}
