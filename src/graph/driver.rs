//! Execution driver: wraps one graph invocation with a wall-clock timeout
//! and produces the user-visible run output.

use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::core::provider::LlmProvider;
use crate::error::{Error, Result};
use crate::graph::{self, AgentState, GraphDeps, Message};
use crate::tools::registry::ToolRegistry;

/// Everything produced by one run, after the graph reaches a terminal node.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub messages: Vec<Message>,
    pub final_response: String,
    pub selected_agent: Option<String>,
    pub iterations: u32,
    pub llm_calls: u32,
}

/// Compiles nothing (the graph has no separate compilation step) but
/// provides the single `invoke` entry point the embedding application calls.
pub struct ExecutionDriver {
    provider: Arc<dyn LlmProvider>,
    registry: Arc<ToolRegistry>,
    config: Arc<Config>,
}

impl ExecutionDriver {
    pub fn new(provider: Arc<dyn LlmProvider>, registry: Arc<ToolRegistry>, config: Arc<Config>) -> Self {
        ExecutionDriver { provider, registry, config }
    }

    /// Run one task to completion, applying `runtime.max_runtime_s` as a
    /// wall-clock timeout when non-zero.
    pub async fn invoke(&self, task: impl Into<String>) -> Result<RunOutput> {
        let state = AgentState::new(task, self.config.clone());
        let max_runtime_s = self.config.runtime.max_runtime_s;

        let provider = self.provider.clone();
        let registry = self.registry.clone();

        let run = async move {
            let deps = GraphDeps { provider: provider.as_ref(), registry: registry.as_ref() };
            graph::invoke(state, &deps).await
        };

        let final_state = if max_runtime_s > 0 {
            match tokio::time::timeout(std::time::Duration::from_secs(max_runtime_s), run).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!("run exceeded {}s wall-clock timeout", max_runtime_s);
                    return Err(Error::Timeout(max_runtime_s));
                }
            }
        } else {
            run.await?
        };

        Ok(RunOutput {
            final_response: final_state
                .final_response
                .clone()
                .unwrap_or_else(|| "No response produced.".to_string()),
            selected_agent: final_state.selected_agent.clone(),
            iterations: final_state.iterations,
            llm_calls: final_state.llm_calls,
            messages: final_state.messages,
        })
    }
}
