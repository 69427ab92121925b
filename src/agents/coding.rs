//! Coding sub-agent: a bounded tool-calling loop that edits code in
//! response to a delegated request.

use crate::core::provider::{GenerationOptions, LlmProvider};
use crate::error::Result;
use crate::graph::message::Message;
use crate::graph::state::{AgentOutcome, AgentState, OutcomeStatus, TaskType};
use crate::tools::ToolRegistry;

use super::loop_guard::LoopGuard;

const MAX_RECURSION_DEPTH: u32 = 3;

const SCENARIOS: &[TaskType] = &[
    TaskType::CodeFix,
    TaskType::CodeGeneration,
    TaskType::CodeValidation,
    TaskType::FileOperation,
    TaskType::ComplexRefactor,
    TaskType::MetaTool,
];

const SYSTEM_PROMPT_HEADER: &str = "You are the coding sub-agent of a task orchestrator. Use the available tools to \
make the change the user asked for, then call `done` with your reasoning once it's complete, or `clarify` if the \
request is ambiguous. Prefer the smallest set of tool calls that accomplishes the request.";

/// Run the coding sub-agent to completion or until its recursion bound is
/// reached, mutating `state` in place.
pub async fn run(state: &mut AgentState, provider: &dyn LlmProvider, registry: &ToolRegistry) -> Result<()> {
    let tool_defs = registry.definitions_for_tasks(SCENARIOS, true, &[], &[]);
    state.messages.insert(0, Message::system(SYSTEM_PROMPT_HEADER.to_string()));

    let mut guard = LoopGuard::new(3);
    let mut depth = 0u32;

    loop {
        let options = GenerationOptions {
            temperature: Some(state.config.llm.generation_temperature),
            tools: Some(tool_defs.clone()),
            ..Default::default()
        };

        let response = generate_with_fallback(state, provider, &options).await?;
        let tool_calls = response.tool_calls.clone().unwrap_or_default();

        if tool_calls.is_empty() {
            state.messages.push(Message::ai(response.content.clone()));
            record_outcome(state, OutcomeStatus::Success, response.content, None);
            return Ok(());
        }

        state.messages.push(Message::ai_with_tool_calls(response.content.clone(), tool_calls.clone()));
        state.tool_calls = tool_calls;
        crate::tools::dispatcher::run_tool_stage(state, registry).await?;

        for hint in guard_hints(state, &mut guard) {
            state.messages.push(Message::system(hint));
        }

        if let Some((name, content)) = last_tool_message(state) {
            if name == "done" {
                state.selected_agent = Some("codur-verification".to_string());
                record_outcome(state, OutcomeStatus::Success, content, None);
                return Ok(());
            }
            if name == "build_verification_response" {
                record_outcome(state, OutcomeStatus::Success, content, None);
                return Ok(());
            }
        }

        depth += 1;
        if depth >= MAX_RECURSION_DEPTH {
            record_outcome(state, OutcomeStatus::Failed, "reached the coding sub-agent's recursion bound without a `done` call".to_string(), None);
            return Ok(());
        }
    }
}

async fn generate_with_fallback(
    state: &mut AgentState,
    provider: &dyn LlmProvider,
    options: &GenerationOptions,
) -> Result<crate::core::provider::LlmResponse> {
    state.check_llm_budget()?;
    state.record_llm_call();
    match provider.generate(&state.messages, options).await {
        Ok(response) => Ok(response),
        Err(e) if e.is_retryable() => {
            if let Some(fallback_model) = state.config.agents.preferences.fallback_model.clone() {
                let mut retry_options = options.clone();
                retry_options.model = Some(fallback_model);
                state.record_llm_call();
                provider.generate(&state.messages, &retry_options).await
            } else {
                Err(e)
            }
        }
        Err(e) => Err(e),
    }
}

fn guard_hints(state: &AgentState, guard: &mut LoopGuard) -> Vec<String> {
    let mut hints = Vec::new();
    if let Some(Message::Tool { name, content, .. }) = state.messages.last() {
        let args = state
            .messages
            .iter()
            .rev()
            .find_map(|m| m.tool_calls().and_then(|calls| calls.iter().find(|c| &c.function.name == name)))
            .map(|c| c.function.arguments.clone())
            .unwrap_or_default();
        if let Some(hint) = guard.record(name, &args, content) {
            hints.push(hint);
        }
    }
    hints
}

fn last_tool_message(state: &AgentState) -> Option<(String, String)> {
    match state.messages.last() {
        Some(Message::Tool { name, content, .. }) => Some((name.clone(), content.clone())),
        _ => None,
    }
}

fn record_outcome(state: &mut AgentState, status: OutcomeStatus, result: String, next_step_suggestion: Option<String>) {
    state.agent_outcomes.push(AgentOutcome {
        agent: "coding".to_string(),
        status,
        result,
        messages: Vec::new(),
        next_step_suggestion,
    });
}
