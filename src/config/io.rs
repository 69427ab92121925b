//! Configuration I/O - Loading and saving configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::Path;

use super::types::{Config, LlmProfile};
use crate::error::{Error, Result};

/// A snapshot of the configuration file
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Path to the config file
    pub path: std::path::PathBuf,
    /// Whether the file exists
    pub exists: bool,
    /// Raw file content
    pub raw: Option<String>,
    /// Parsed configuration
    pub config: Option<Config>,
    /// Validation issues
    pub issues: Vec<String>,
}

/// Load configuration from the default path, falling back to environment
/// variables when no config file is present.
pub fn load_config() -> Result<Config> {
    let config_path = super::paths::config_path();

    if config_path.exists() {
        load_config_from_path(&config_path)
    } else {
        load_config_from_env()
    }
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = if path.extension().map_or(false, |ext| ext == "toml") {
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?
    } else if path.extension().map_or(false, |ext| ext == "json") {
        json5::from_str(&content).map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
    } else {
        json5::from_str(&content)
            .or_else(|_| toml::from_str(&content).map_err(|e| Error::Config(e.to_string())))
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?
    };

    Ok(config)
}

/// Build a configuration entirely from environment variables, layered over
/// `Config::default()`. Used when no config file exists on disk.
pub fn load_config_from_env() -> Result<Config> {
    dotenvy::dotenv().ok();

    let mut config = Config::default();

    // LLM profile override: an API key alone is enough to stand up the
    // default profile against a specific provider/model.
    if std::env::var("OPENROUTER_API_KEY").is_ok() {
        // the key itself is read by the provider adapter, not stored in Config
        let model = std::env::var("DEFAULT_MODEL")
            .or_else(|_| std::env::var("OPENROUTER_MODEL"))
            .unwrap_or_else(|_| "anthropic/claude-sonnet-4".to_string());
        config.llm.profiles.insert(
            config.llm.default_profile.clone(),
            LlmProfile {
                provider: "openrouter".to_string(),
                model,
                temperature: None,
            },
        );
    }

    if let Ok(profile) = std::env::var("DEFAULT_LLM_PROFILE") {
        config.llm.default_profile = profile;
    }

    // Runtime bounds
    if let Ok(v) = std::env::var("MAX_ITERATIONS") {
        if let Ok(v) = v.parse() {
            config.runtime.max_iterations = v;
        }
    }
    if let Ok(v) = std::env::var("MAX_LLM_CALLS") {
        if let Ok(v) = v.parse() {
            config.runtime.max_llm_calls = v;
        }
    }
    if let Ok(v) = std::env::var("MAX_RUNTIME_SECONDS") {
        if let Ok(v) = v.parse() {
            config.runtime.max_runtime_s = v;
        }
    }
    if let Ok(v) = std::env::var("ALLOW_OUTSIDE_WORKSPACE") {
        config.runtime.allow_outside_workspace = v == "true" || v == "1";
    }

    // Tool policy
    if let Ok(v) = std::env::var("ALLOW_READ_SECRETS") {
        config.tools.allow_read_secrets = v == "true" || v == "1";
    }
    if let Ok(v) = std::env::var("ALLOW_GIT_WRITE") {
        config.tools.allow_git_write = v == "true" || v == "1";
    }

    Ok(config)
}

/// Save configuration to a file
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    let content = if path.extension().map_or(false, |ext| ext == "toml") {
        toml::to_string_pretty(config).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
    } else {
        serde_json::to_string_pretty(config).map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, content)?;
    Ok(())
}

/// Read a configuration file into a snapshot
#[allow(dead_code)]
pub fn read_config_snapshot(path: &Path) -> ConfigSnapshot {
    if !path.exists() {
        return ConfigSnapshot {
            path: path.to_path_buf(),
            exists: false,
            raw: None,
            config: None,
            issues: vec!["Configuration file does not exist".to_string()],
        };
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            return ConfigSnapshot {
                path: path.to_path_buf(),
                exists: true,
                raw: None,
                config: None,
                issues: vec![format!("Failed to read file: {}", e)],
            };
        }
    };

    let config = match load_config_from_path(path) {
        Ok(config) => Some(config),
        Err(e) => {
            return ConfigSnapshot {
                path: path.to_path_buf(),
                exists: true,
                raw: Some(raw),
                config: None,
                issues: vec![format!("Failed to parse config: {}", e)],
            };
        }
    };

    ConfigSnapshot {
        path: path.to_path_buf(),
        exists: true,
        raw: Some(raw),
        config,
        issues: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test_config.json");

        let config = Config::default();
        save_config(&config, &path).unwrap();

        let loaded = load_config_from_path(&path).unwrap();
        assert_eq!(loaded.llm.default_profile, config.llm.default_profile);
    }

    #[test]
    fn test_env_overrides_runtime_bounds() {
        std::env::set_var("MAX_ITERATIONS", "42");
        let config = load_config_from_env().unwrap();
        assert_eq!(config.runtime.max_iterations, 42);
        std::env::remove_var("MAX_ITERATIONS");
    }
}
