//! Coding and verification sub-agents: bounded recursive tool-calling loops
//! delegated into from the orchestration graph's `Coding`/`Verification` nodes.

pub mod coding;
pub mod loop_guard;
pub mod verification;
