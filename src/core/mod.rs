//! Core module - the narrow LLM provider contract
//!
//! This module defines the one core abstraction the rest of the crate is
//! built against: the `LlmProvider` trait backends implement.

pub mod provider;

// Re-export core traits for convenient access
pub use provider::{GenerationOptions, LlmProvider, LlmResponse, StreamingChunk};
