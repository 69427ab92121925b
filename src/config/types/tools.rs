//! Tool dispatcher policy: ignore rules, secret globs, write gates

use serde::{Deserialize, Serialize};

/// Policy knobs consulted by the tool dispatcher's guard stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Directory names skipped by search/listing tools regardless of
    /// `.gitignore` (e.g. `.git`, `node_modules`, `target`)
    pub exclude_dirs: Vec<String>,

    /// Whether listing/search tools surface dotfiles
    pub include_hidden_files: bool,

    /// Whether search/listing tools additionally honor `.gitignore`
    pub respect_gitignore: bool,

    /// Whether read tools may open files matching `secret_globs`
    pub allow_read_secrets: bool,

    /// Glob patterns treated as secret (e.g. `*.env`, `**/*.pem`)
    pub secret_globs: Vec<String>,

    /// Whether the git tool may run mutating subcommands (commit, push,
    /// checkout) instead of read-only ones (status, diff, log)
    pub allow_git_write: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            exclude_dirs: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
                ".venv".to_string(),
                "__pycache__".to_string(),
            ],
            include_hidden_files: false,
            respect_gitignore: true,
            allow_read_secrets: false,
            secret_globs: vec![
                "*.env".to_string(),
                "**/*.pem".to_string(),
                "**/*.key".to_string(),
                "**/secrets.*".to_string(),
            ],
            allow_git_write: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_blocked_by_default() {
        let tools = ToolsConfig::default();
        assert!(!tools.allow_read_secrets);
        assert!(!tools.allow_git_write);
        assert!(!tools.secret_globs.is_empty());
    }
}
