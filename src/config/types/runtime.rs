//! Graph-level runtime bounds

use serde::{Deserialize, Serialize};

/// Bounds enforced by the orchestration graph and its execution driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Hard cap on graph iterations before the router is forced to accept
    /// the current result (see `MaxIterationsExceeded`)
    pub max_iterations: u32,

    /// Hard cap on LLM calls across planning, coding, and verification
    pub max_llm_calls: u32,

    /// Wall-clock timeout for a single run, in seconds
    pub max_runtime_s: u64,

    /// Whether tool calls may resolve paths outside the workspace root
    pub allow_outside_workspace: bool,

    /// Whether the dispatcher should detect tool calls embedded in plain
    /// text responses when a provider doesn't support native tool-calling
    pub detect_tool_calls_from_text: bool,

    /// Ordered LLM profile names to fall back through when the primary
    /// planner profile's provider errors out
    pub planner_fallback_profiles: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            max_iterations: 25,
            max_llm_calls: 60,
            max_runtime_s: 600,
            allow_outside_workspace: false,
            detect_tool_calls_from_text: false,
            planner_fallback_profiles: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_conservative() {
        let runtime = RuntimeConfig::default();
        assert!(!runtime.allow_outside_workspace);
        assert!(runtime.max_iterations > 0);
        assert!(runtime.max_llm_calls > 0);
    }
}
