//! Agent preferences and per-agent configuration entries

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Agent selection preferences and per-agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Default agent selection and routing preferences
    #[serde(default)]
    pub preferences: AgentPreferences,

    /// Per-agent configuration entries, keyed by agent name
    #[serde(default)]
    pub configs: HashMap<String, AgentConfigEntry>,

    /// Free-form named profiles (system prompts, tool allowlists) agents can
    /// opt into without the dispatcher needing to know their shape.
    #[serde(default)]
    pub profiles: HashMap<String, serde_json::Value>,
}

/// Which agent handles which classified task shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPreferences {
    /// Agent used when the classifier can't route more specifically
    #[serde(default = "default_agent_name")]
    pub default_agent: String,

    /// Routing table: which agent profile handles which task scale
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Model used when no profile-specific model is configured
    #[serde(default)]
    pub fallback_model: Option<String>,
}

impl Default for AgentPreferences {
    fn default() -> Self {
        AgentPreferences {
            default_agent: default_agent_name(),
            routing: RoutingConfig::default(),
            fallback_model: None,
        }
    }
}

/// Routing targets for the three task scales the classifier recognizes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingConfig {
    #[serde(default)]
    pub simple: Option<String>,
    #[serde(default)]
    pub complex: Option<String>,
    #[serde(default)]
    pub multifile: Option<String>,
}

/// One agent's enablement and parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfigEntry {
    #[serde(rename = "type")]
    pub agent_type: AgentConfigType,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// What kind of collaborator an agent-config entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentConfigType {
    Llm,
    Mcp,
    Tool,
}

fn default_agent_name() -> String {
    "coding".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_agent_is_coding() {
        let prefs = AgentPreferences::default();
        assert_eq!(prefs.default_agent, "coding");
    }
}
