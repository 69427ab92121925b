//! Error types for the orchestrator core

use thiserror::Error;

/// Result type alias using the core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the orchestrator core
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (default profile, default agent, unknown provider)
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider transport/API error
    #[error("LLM provider error: {0}")]
    Provider(String),

    /// The run exceeded `runtime.max_llm_calls`
    #[error("LLM call limit exceeded ({0} calls)")]
    LlmCallLimitExceeded(u32),

    /// `iterations` exceeded `runtime.max_iterations`; the router accepted the current result
    #[error("Max iterations exceeded ({0})")]
    MaxIterationsExceeded(u32),

    /// Wall-clock run timeout
    #[error("Timeout: exceeded {0} seconds")]
    Timeout(u64),

    /// The LLM planner could not recover a JSON decision after corrective retry
    #[error("Planning decision error: {0}")]
    PlanningDecision(String),

    /// A tool-dispatch error: unknown tool, invalid args, file not found, non-zero exit, etc.
    #[error("Tool dispatch error: {0}")]
    ToolDispatch(String),

    /// A resolved path escaped the workspace root without `allow_outside_root`
    #[error("Path escapes workspace root: {0}")]
    PathEscapesRoot(String),

    /// A read was refused by the secret-glob guard
    #[error("Secret files disabled: {0}")]
    SecretGuard(String),

    /// A write was refused by the test-overwrite guard
    #[error("Refusing to overwrite test file without explicit request: {0}")]
    TestOverwriteGuard(String),

    /// A sub-agent recursion depth bound was exceeded
    #[error("Sub-agent recursion depth exceeded: {0}")]
    SubagentDepthExceeded(String),

    /// MCP transport/protocol error
    #[error("MCP error: {0}")]
    Mcp(String),

    /// Sandbox/subprocess execution error
    #[error("Sandbox error: {0}")]
    Sandbox(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// A subprocess or run timed out
    #[error("Operation timed out: {0}")]
    Elapsed(#[from] tokio::time::error::Elapsed),

    /// Invalid input (malformed tool arguments, invariant violations)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Transient errors worth retrying (LLM transport, rate limiting).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Http(_) | Error::RateLimit(_) | Error::Timeout(_) | Error::Elapsed(_)
        )
    }

    /// Errors that stem from malformed caller input rather than the environment.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidInput(_) | Error::NotFound(_) | Error::PathEscapesRoot(_)
        )
    }
}
