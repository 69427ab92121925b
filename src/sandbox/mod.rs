//! Sandbox module - subprocess-based code execution
//!
//! A single OS-level executor: restricted-directory subprocess execution,
//! timeout-wrapped at the call site (section 5's concurrency model).

pub mod executor;
mod os_sandbox;

pub use executor::{CodeExecutor, ExecutionRequest, ExecutionResult, Language};
pub use os_sandbox::OsSandbox;
