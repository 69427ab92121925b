//! Loop guard for the coding/verification sub-agent loops.
//!
//! Detects when the LLM is stuck calling the same tool repeatedly with the
//! same result and returns a hint to inject so the loop doesn't spin
//! forever inside its recursion bound.

use std::collections::VecDeque;

use sha2::{Digest, Sha256};

/// Tracks recent tool calls and detects stuck loops.
pub struct LoopGuard {
    /// Recent (tool_name, arguments_hash, result_hash) entries.
    recent: VecDeque<(String, [u8; 32], [u8; 32])>,
    /// How many consecutive same-tool-same-result calls trigger intervention.
    threshold: usize,
}

impl LoopGuard {
    /// `threshold` is how many consecutive identical results from the same
    /// tool trigger a hint.
    pub fn new(threshold: usize) -> Self {
        LoopGuard { recent: VecDeque::with_capacity(threshold + 1), threshold }
    }

    /// Record a tool call and its result. Returns `Some(hint)` if the loop
    /// appears stuck and should be told to change approach.
    pub fn record(&mut self, tool_name: &str, arguments: &str, result: &str) -> Option<String> {
        let arg_hash = hash(arguments);
        let result_hash = hash(result);

        self.recent.push_back((tool_name.to_string(), arg_hash, result_hash));
        while self.recent.len() > self.threshold {
            self.recent.pop_front();
        }

        if self.recent.len() >= self.threshold {
            let all_same = self.recent.iter().all(|(name, _, snip)| name == tool_name && *snip == result_hash);
            if all_same {
                self.recent.clear();
                return Some(format!(
                    "The tool '{tool_name}' has returned the same result {} times in a row. Do not call it again with a similar query; try a different approach or finish with what you already know.",
                    self.threshold
                ));
            }
        }

        None
    }

    pub fn reset(&mut self) {
        self.recent.clear();
    }
}

impl Default for LoopGuard {
    fn default() -> Self {
        LoopGuard::new(3)
    }
}

fn hash(s: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(s.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_trigger_on_different_results() {
        let mut guard = LoopGuard::new(3);
        assert!(guard.record("web_search", r#"{"q":"a"}"#, "result 1").is_none());
        assert!(guard.record("web_search", r#"{"q":"b"}"#, "result 2").is_none());
        assert!(guard.record("web_search", r#"{"q":"c"}"#, "result 3").is_none());
    }

    #[test]
    fn test_triggers_on_repeated_same_result() {
        let mut guard = LoopGuard::new(3);
        let result = "No results found";
        assert!(guard.record("web_search", r#"{"q":"a"}"#, result).is_none());
        assert!(guard.record("web_search", r#"{"q":"b"}"#, result).is_none());
        assert!(guard.record("web_search", r#"{"q":"c"}"#, result).is_some());
    }

    #[test]
    fn test_resets_after_trigger() {
        let mut guard = LoopGuard::new(2);
        let result = "same";
        assert!(guard.record("t", "{}", result).is_none());
        assert!(guard.record("t", "{}", result).is_some());
        assert!(guard.record("t", "{}", result).is_none());
    }
}
