//! MCP server launch configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How to launch one MCP server subprocess over stdio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    /// Executable to run
    pub command: String,

    /// Arguments passed to `command`
    #[serde(default)]
    pub args: Vec<String>,

    /// Working directory for the subprocess; defaults to the workspace root
    #[serde(default)]
    pub cwd: Option<String>,

    /// Additional environment variables for the subprocess
    #[serde(default)]
    pub env: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_server_config() {
        let cfg = McpServerConfig {
            command: "mcp-server-filesystem".to_string(),
            args: vec![],
            cwd: None,
            env: HashMap::new(),
        };
        assert_eq!(cfg.command, "mcp-server-filesystem");
    }
}
