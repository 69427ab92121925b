//! The orchestration graph: a small node enum and a single `step` interpreter
//! that drives one run from `Plan` to `End`.
//!
//! Dynamic dispatch on node name is replaced with a variant enum per node;
//! `invoke` is the single compiled-graph entry point the driver calls.

pub mod driver;
pub mod message;
pub mod state;

pub use message::Message;
pub use state::{
    AgentOutcome, AgentState, ClassificationResult, NextAction, OutcomeStatus, TaskType,
    ToolContext, ToolGuard, ToolSideEffect,
};

use tracing::{debug, info, warn};

use crate::core::provider::LlmProvider;
use crate::error::Result;
use crate::tools::registry::ToolRegistry;

/// One node of the orchestration graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Plan,
    Delegate,
    Tool,
    Coding,
    Verification,
    Review,
    End,
}

/// Collaborators a graph run needs but does not own.
pub struct GraphDeps<'a> {
    pub provider: &'a dyn LlmProvider,
    pub registry: &'a ToolRegistry,
}

/// Run the graph to completion starting from `Plan`.
///
/// The recursion bound is `max(5, 5 * max_iterations)` so the loop always
/// terminates even when `max_iterations` is configured to zero.
pub async fn invoke(mut state: AgentState, deps: &GraphDeps<'_>) -> Result<AgentState> {
    let recursion_bound = (state.config.runtime.max_iterations.saturating_mul(5)).max(5);
    let mut node = Node::Plan;
    let mut steps: u32 = 0;

    loop {
        if node == Node::End {
            break;
        }
        if steps >= recursion_bound {
            warn!("graph recursion bound ({}) reached, forcing end", recursion_bound);
            if state.final_response.is_none() {
                state.final_response = Some(
                    "Reached the maximum number of internal steps without a final answer."
                        .to_string(),
                );
            }
            break;
        }
        steps += 1;
        debug!("graph step {}/{}: {:?}", steps, recursion_bound, node);
        node = step(&mut state, node, deps).await?;
    }

    info!("graph run finished after {} steps, iterations={}", steps, state.iterations);
    Ok(state)
}

/// Interpret one node transition, mutating `state` in place and returning
/// the next node to run.
async fn step(state: &mut AgentState, node: Node, deps: &GraphDeps<'_>) -> Result<Node> {
    match node {
        Node::Plan => {
            state.iterations += 1;
            crate::planning::run(state, deps.provider, deps.registry).await
        }
        Node::Delegate => {
            // `delegate` always routes to the agent named by `selected_agent`,
            // defaulting to the coding sub-agent.
            match state.selected_agent.as_deref() {
                Some(name) if name.contains("verification") => Ok(Node::Verification),
                _ => Ok(Node::Coding),
            }
        }
        Node::Tool => {
            crate::tools::dispatcher::run_tool_stage(state, deps.registry).await?;
            Ok(Node::Review)
        }
        Node::Coding => {
            crate::agents::coding::run(state, deps.provider, deps.registry).await?;
            Ok(Node::Review)
        }
        Node::Verification => {
            crate::agents::verification::run(state, deps.provider, deps.registry).await?;
            Ok(Node::Review)
        }
        Node::Review => crate::review::run(state),
        Node::End => Ok(Node::End),
    }
}
