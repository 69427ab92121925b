//! Configuration validation
//!
//! Validates configuration and reports issues.

use super::types::Config;

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ConfigValidationResult {
    /// Whether the config is valid
    pub valid: bool,
    /// Validation errors (critical)
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings (non-critical)
    pub warnings: Vec<ValidationIssue>,
}

impl ConfigValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        ConfigValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.valid = false;
        self.errors.push(issue);
        self
    }

    /// Add a warning
    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }
}

/// A validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the config field
    pub path: String,
    /// Issue message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::valid();

    result = validate_llm_config(config, result);
    result = validate_agents_config(config, result);
    result = validate_runtime_config(config, result);
    result = validate_mcp_config(config, result);

    result
}

fn validate_llm_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if !config.llm.profiles.contains_key(&config.llm.default_profile) {
        result = result.with_error(
            ValidationIssue::new(
                "llm.default_profile",
                format!(
                    "default_profile '{}' has no matching entry in llm.profiles",
                    config.llm.default_profile
                ),
            )
            .with_suggestion("Add a profile with this name to llm.profiles, or change default_profile"),
        );
    }

    if config.llm.profiles.is_empty() {
        result = result.with_warning(
            ValidationIssue::new("llm.profiles", "No LLM profiles configured")
                .with_suggestion("Set OPENROUTER_API_KEY or configure llm.profiles directly"),
        );
    }

    result
}

fn validate_agents_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.agents.preferences.default_agent.trim().is_empty() {
        result = result.with_error(
            ValidationIssue::new("agents.preferences.default_agent", "default_agent must not be empty")
                .with_suggestion("Set agents.preferences.default_agent to a known agent name"),
        );
    }

    result
}

fn validate_runtime_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.runtime.max_iterations == 0 {
        result = result.with_error(ValidationIssue::new(
            "runtime.max_iterations",
            "max_iterations must be greater than zero",
        ));
    }

    if config.runtime.max_llm_calls == 0 {
        result = result.with_error(ValidationIssue::new(
            "runtime.max_llm_calls",
            "max_llm_calls must be greater than zero",
        ));
    }

    if config.runtime.max_runtime_s == 0 {
        result = result.with_warning(
            ValidationIssue::new("runtime.max_runtime_s", "max_runtime_s is zero; every run will time out immediately")
                .with_suggestion("Set runtime.max_runtime_s to a positive number of seconds"),
        );
    }

    result
}

fn validate_mcp_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    for (name, server) in &config.mcp_servers {
        if server.command.trim().is_empty() {
            result = result.with_error(ValidationIssue::new(
                format!("mcp_servers.{}.command", name),
                "MCP server command must not be empty",
            ));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        let result = validate_config(&config);

        // Default config ships a default profile, a default agent, and
        // non-zero runtime bounds, so it should validate clean.
        assert!(result.errors.is_empty());
    }

    #[test]
    fn test_validate_rejects_dangling_default_profile() {
        let mut config = Config::default();
        config.llm.default_profile = "nonexistent".to_string();
        let result = validate_config(&config);
        assert!(!result.valid);
    }
}
