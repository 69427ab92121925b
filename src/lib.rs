//! # codur-core
//!
//! The core of an autonomous coding-agent orchestrator: a graph-based task
//! scheduler that routes natural-language requests through a planning
//! pipeline, dispatches work to specialized sub-agents and an extensible
//! tool registry, verifies results, and loops until a terminal condition
//! is met.
//!
//! ## Architecture
//!
//! - **Graph** (`graph`): the orchestration graph — shared `AgentState`,
//!   tagged `Message` variants, and the node interpreter that drives a run.
//! - **Planning** (`planning`): the two-phase planner — a textual
//!   pre-planner, a pattern-based quick classifier, and an LLM planner
//!   with JSON-mode decisions and fallback profiles.
//! - **Tools** (`tools`): the tool registry and dispatcher — annotation-driven
//!   discovery, JSON-schema generation, and path-sandboxed execution.
//! - **Agents** (`agents`): the coding and verification sub-agents — bounded
//!   recursive tool-calling loops.
//! - **Review** (`review`): the router/review node that closes the loop
//!   between execution, verification, and replanning.
//! - **Core traits** (`core`): the narrow LLM provider contract.
//! - **Sandbox** (`sandbox`): subprocess-based code execution.
//! - **MCP** (`mcp`): the stdio Model Context Protocol client.
//! - **Configuration** (`config`): the immutable, nested `Config` record.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codur_core::config::Config;
//! use codur_core::graph::driver::ExecutionDriver;
//! use codur_core::Result;
//!
//! # async fn run() -> Result<()> {
//! let config = Config::default();
//! // An `ExecutionDriver` is built from a provider, a tool registry, and
//! // config; see `graph::driver` for the full wiring.
//! let _ = config;
//! # Ok(())
//! # }
//! ```

pub mod agents;
pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod mcp;
pub mod planning;
pub mod review;
pub mod sandbox;
pub mod tools;

pub use error::{Error, Result};

pub use core::{GenerationOptions, LlmProvider, LlmResponse};
pub use graph::message::Message;
pub use graph::state::{AgentState, ClassificationResult, TaskType};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
