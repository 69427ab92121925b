//! Configuration module - Modular configuration management
//!
//! Configuration is split into focused modules:
//! - types/mod.rs: Core configuration types (Config, LlmConfig, LlmProfile)
//! - types/agents.rs: Agent preferences and per-agent configuration
//! - types/runtime.rs: Graph-level runtime bounds
//! - types/tools.rs: Tool dispatcher policy
//! - types/mcp.rs: MCP server launch configuration
//! - io.rs: Configuration loading and saving
//! - validation.rs: Configuration validation
//! - paths.rs: Configuration file paths

mod io;
mod paths;
mod types;
mod validation;

// Re-export core config types
pub use types::{Config, LlmConfig, LlmProfile};

// Re-export agent types
pub use types::agents::{
    AgentConfigEntry, AgentConfigType, AgentPreferences, AgentsConfig, RoutingConfig,
};

// Re-export runtime types
pub use types::runtime::RuntimeConfig;

// Re-export tool policy types
pub use types::tools::ToolsConfig;

// Re-export MCP types
pub use types::mcp::McpServerConfig;

// Re-export IO and utilities
pub use io::{load_config, load_config_from_env, load_config_from_path, save_config, ConfigSnapshot};
pub use paths::{config_dir, config_path, state_dir, workspace_dir};
pub use validation::{validate_config, ConfigValidationResult, ValidationIssue};
