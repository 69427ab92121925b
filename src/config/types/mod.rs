//! Configuration types module
//!
//! Re-exports all configuration types, split into focused modules the way
//! this codebase splits every other cross-cutting concern.

pub mod agents;
pub mod mcp;
pub mod runtime;
pub mod tools;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Immutable, nested application configuration.
///
/// This is the record threaded through every node of the orchestration
/// graph via `AgentState.config`. Nothing in this record is ever mutated
/// after load; a new run gets a fresh `Arc<Config>` handle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// LLM profiles and sampling temperatures
    #[serde(default)]
    pub llm: LlmConfig,

    /// Agent preferences and per-agent configuration entries
    #[serde(default)]
    pub agents: agents::AgentsConfig,

    /// Graph-level runtime bounds (iterations, LLM calls, timeouts)
    #[serde(default)]
    pub runtime: runtime::RuntimeConfig,

    /// Tool dispatcher policy (ignore rules, secret globs, git write gate)
    #[serde(default)]
    pub tools: tools::ToolsConfig,

    /// MCP server launch configurations, keyed by server name
    #[serde(default)]
    pub mcp_servers: HashMap<String, mcp::McpServerConfig>,
}

/// LLM profile and temperature configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Profile used when no more specific profile is selected
    #[serde(default = "default_profile_name")]
    pub default_profile: String,

    /// Named provider/model profiles
    #[serde(default = "default_profiles")]
    pub profiles: HashMap<String, LlmProfile>,

    /// Temperature used by the Phase 2 planner (low, e.g. 0.0-0.2)
    #[serde(default = "default_planning_temperature")]
    pub planning_temperature: f32,

    /// Temperature used by the coding sub-agent
    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            default_profile: default_profile_name(),
            profiles: default_profiles(),
            planning_temperature: default_planning_temperature(),
            generation_temperature: default_generation_temperature(),
        }
    }
}

/// A single named LLM profile: which provider, which model, what temperature.
///
/// The concrete provider adapter is an external collaborator (see
/// `crate::core::provider::LlmProvider`); this record only carries enough
/// to select and parameterize one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProfile {
    /// Provider identifier (e.g. "openrouter", "anthropic"); resolved by
    /// whatever `LlmProvider` registry the embedding application builds.
    pub provider: String,
    /// Model identifier passed through to the provider
    pub model: String,
    /// Optional temperature override for this profile
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_profile_name() -> String {
    "default".to_string()
}

fn default_profiles() -> HashMap<String, LlmProfile> {
    let mut profiles = HashMap::new();
    profiles.insert(
        "default".to_string(),
        LlmProfile {
            provider: "openrouter".to_string(),
            model: "anthropic/claude-sonnet-4".to_string(),
            temperature: None,
        },
    );
    profiles
}

fn default_planning_temperature() -> f32 {
    0.1
}

fn default_generation_temperature() -> f32 {
    0.3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.llm.default_profile, "default");
        assert!(config.llm.profiles.contains_key("default"));
    }

    #[test]
    fn test_planning_temperature_lower_than_generation() {
        let config = Config::default();
        assert!(config.llm.planning_temperature < config.llm.generation_temperature);
    }
}
