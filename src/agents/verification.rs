//! Verification sub-agent: a read-only bounded tool-calling loop that checks
//! whether a completed change actually satisfies the original request.

use crate::core::provider::{GenerationOptions, LlmProvider};
use crate::error::Result;
use crate::graph::message::Message;
use crate::graph::state::{AgentOutcome, AgentState, OutcomeStatus, TaskType, ToolSideEffect};
use crate::tools::meta::{parse_verification_response, VerificationResponseArgs};
use crate::tools::ToolRegistry;

use super::loop_guard::LoopGuard;

const MAX_RECURSION_DEPTH: u32 = 4;

const SCENARIOS: &[TaskType] = &[
    TaskType::CodeValidation,
    TaskType::ResultVerification,
    TaskType::FileOperation,
    TaskType::Explanation,
];

const EXCLUDE_SIDE_EFFECTS: &[ToolSideEffect] = &[ToolSideEffect::FileMutation, ToolSideEffect::StateChange];

const SYSTEM_PROMPT_HEADER: &str = "You are the verification sub-agent of a task orchestrator. The coding sub-agent \
believes it finished the original request; your job is to check that it actually did. Infer the success criteria \
from the original request, choose a verification strategy (running tests, executing the code, static analysis, or a \
combination), use the read-only tools available to carry it out, and finish by calling `build_verification_response` \
with your verdict. Never modify files.";

/// Run the verification sub-agent to completion or until its recursion bound
/// is reached, mutating `state` in place.
pub async fn run(state: &mut AgentState, provider: &dyn LlmProvider, registry: &ToolRegistry) -> Result<()> {
    let tool_defs = registry.definitions_for_tasks(SCENARIOS, true, &[], EXCLUDE_SIDE_EFFECTS);
    state.messages.push(Message::system(SYSTEM_PROMPT_HEADER.to_string()));

    let mut guard = LoopGuard::new(3);
    let mut depth = 0u32;

    loop {
        let options = GenerationOptions {
            temperature: Some(0.0),
            tools: Some(tool_defs.clone()),
            ..Default::default()
        };

        state.check_llm_budget()?;
        state.record_llm_call();
        let response = provider.generate(&state.messages, &options).await?;
        let tool_calls = response.tool_calls.clone().unwrap_or_default();

        if tool_calls.is_empty() {
            state.messages.push(Message::ai(response.content.clone()));
            record_outcome(state, unresolved_outcome());
            return Ok(());
        }

        state.messages.push(Message::ai_with_tool_calls(response.content.clone(), tool_calls.clone()));
        state.tool_calls = tool_calls;
        crate::tools::dispatcher::run_tool_stage(state, registry).await?;

        if let Some(hint) = record_guard_hint(state, &mut guard) {
            state.messages.push(Message::system(hint));
        }

        if let Some(verdict) = find_verification_verdict(state) {
            record_outcome(state, verdict);
            return Ok(());
        }

        depth += 1;
        if depth >= MAX_RECURSION_DEPTH {
            record_outcome(state, unresolved_outcome());
            return Ok(());
        }
    }
}

fn record_guard_hint(state: &AgentState, guard: &mut LoopGuard) -> Option<String> {
    if let Some(Message::Tool { name, content, .. }) = state.messages.last() {
        let args = state
            .messages
            .iter()
            .rev()
            .find_map(|m| m.tool_calls().and_then(|calls| calls.iter().find(|c| &c.function.name == name)))
            .map(|c| c.function.arguments.clone())
            .unwrap_or_default();
        return guard.record(name, &args, content);
    }
    None
}

/// Scan the most recent tool call/result pair for `build_verification_response`
/// and, if present, adopt its structured arguments as the outcome.
fn find_verification_verdict(state: &AgentState) -> Option<VerificationResponseArgs> {
    let Message::Tool { name, .. } = state.messages.last()? else { return None };
    if name != "build_verification_response" {
        return None;
    }
    let raw_args = state
        .messages
        .iter()
        .rev()
        .find_map(|m| m.tool_calls().and_then(|calls| calls.iter().find(|c| c.function.name == *name)))
        .map(|c| c.function.arguments.clone())?;
    parse_verification_response(&raw_args)
}

fn unresolved_outcome() -> VerificationResponseArgs {
    VerificationResponseArgs {
        passed: false,
        reasoning: "build_verification_response not yet called".to_string(),
        expected: None,
        actual: None,
        suggestions: Vec::new(),
    }
}

fn record_outcome(state: &mut AgentState, verdict: VerificationResponseArgs) {
    let status = if verdict.passed { OutcomeStatus::Success } else { OutcomeStatus::Failed };
    let next_step_suggestion = if verdict.suggestions.is_empty() { None } else { Some(verdict.suggestions.join("; ")) };
    state.agent_outcomes.push(AgentOutcome {
        agent: "verification".to_string(),
        status,
        result: verdict.reasoning,
        messages: Vec::new(),
        next_step_suggestion,
    });
}
