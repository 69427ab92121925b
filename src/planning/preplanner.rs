//! Phase 0: textual pre-planner
//!
//! Regex/keyword rules over the latest human message that emit a deterministic
//! tool call (or a canned terminal response) for a narrow vocabulary of
//! greetings and imperative file operations, without ever invoking an LLM.
//!
//! Ownership split (an Open Question the source left ambiguous): this layer
//! owns only the patterns enumerated below — an explicit imperative verb, or
//! a bare greeting. Anything else, including a message that merely mentions
//! a file without an imperative verb, is left to the classifier/planner.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::core::provider::ToolCall;

/// What the pre-planner decided, if anything.
pub enum PreplanOutcome {
    /// Short-circuit straight to a terminal response.
    Respond(String),
    /// Emit exactly one deterministic tool call.
    ToolCall(ToolCall),
}

const GREETING_WORDS: &[&str] = &["hi", "hello", "hey", "yo", "thanks", "thank", "ok", "okay"];

static EXPLAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(what does|explain|describe|summarize)\b.*?([./\w-]+\.\w+)"#).unwrap()
});
static COPY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^copy\s+([./@\w-]+\.?\w*)\s+to\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static MOVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^move\s+([./@\w-]+\.?\w*)\s+to\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static DELETE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)^delete\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static READ_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"(?i)^read\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static LINE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^line count of\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static WRITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^write\s+(.+?)\s+to\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static APPEND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^append\s+(.+?)\s+to\s+([./@\w-]+\.?\w*)\s*$"#).unwrap());
static LIST_FILES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^list files(?:\s+in\s+([./@\w-]+))?\s*$"#).unwrap());
static FIND_FILES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^find files named\s+(.+)$"#).unwrap());
static GREP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^grep\s+(.+?)\s+in\s+([./@\w-]+)\s*$"#).unwrap());

fn strip_at(s: &str) -> String {
    s.trim().trim_start_matches('@').to_string()
}

/// Apply the Phase 0 rules, first match wins. Returns `None` when nothing
/// matches so flow continues to Phase 1/2.
pub fn try_preplan(message: &str) -> Option<PreplanOutcome> {
    let trimmed = message.trim();

    if trimmed.is_empty() {
        return Some(PreplanOutcome::Respond(canned_greeting()));
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    if words.len() <= 3 {
        let lowered = trimmed.to_lowercase();
        if GREETING_WORDS.iter().any(|w| lowered.contains(w)) {
            return Some(PreplanOutcome::Respond(canned_greeting()));
        }
    }

    if let Some(caps) = EXPLAIN_RE.captures(trimmed) {
        let path = strip_at(&caps[2]);
        return Some(PreplanOutcome::ToolCall(tool_call("read_file", json!({"path": path}))));
    }

    if let Some(caps) = COPY_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call(
            "copy_file",
            json!({"source": strip_at(&caps[1]), "destination": strip_at(&caps[2])}),
        )));
    }

    if let Some(caps) = MOVE_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call(
            "move_file",
            json!({"source": strip_at(&caps[1]), "destination": strip_at(&caps[2])}),
        )));
    }

    if let Some(caps) = DELETE_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call("delete_file", json!({"path": strip_at(&caps[1])}))));
    }

    if let Some(caps) = LINE_COUNT_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call("line_count", json!({"path": strip_at(&caps[1])}))));
    }

    if let Some(caps) = WRITE_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call(
            "write_file",
            json!({"path": strip_at(&caps[2]), "content": caps[1].to_string()}),
        )));
    }

    if let Some(caps) = APPEND_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call(
            "append_file",
            json!({"path": strip_at(&caps[2]), "content": caps[1].to_string()}),
        )));
    }

    // `read X` must lose to the more specific explain/write/append patterns above.
    if let Some(caps) = READ_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call("read_file", json!({"path": strip_at(&caps[1])}))));
    }

    if let Some(caps) = LIST_FILES_RE.captures(trimmed) {
        let dir = caps.get(1).map(|m| strip_at(m.as_str())).unwrap_or_else(|| ".".to_string());
        return Some(PreplanOutcome::ToolCall(tool_call("list_files", json!({"path": dir}))));
    }

    if let Some(caps) = FIND_FILES_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call("find_files", json!({"pattern": caps[1].trim()}))));
    }

    if let Some(caps) = GREP_RE.captures(trimmed) {
        return Some(PreplanOutcome::ToolCall(tool_call(
            "grep_files",
            json!({"pattern": caps[1].trim(), "path": strip_at(&caps[2])}),
        )));
    }

    None
}

fn tool_call(name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        call_type: "function".to_string(),
        function: crate::core::provider::FunctionCall {
            name: name.to_string(),
            arguments: args.to_string(),
        },
    }
}

fn canned_greeting() -> String {
    "Hello! How can I help you with your coding tasks today?".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_message_greets() {
        match try_preplan("").unwrap() {
            PreplanOutcome::Respond(text) => assert_eq!(text, canned_greeting()),
            _ => panic!("expected a canned greeting"),
        }
    }

    #[test]
    fn test_short_greeting() {
        match try_preplan("hello").unwrap() {
            PreplanOutcome::Respond(text) => assert_eq!(text, canned_greeting()),
            _ => panic!("expected a canned greeting"),
        }
    }

    #[test]
    fn test_copy_file_pattern() {
        match try_preplan("copy a.txt to b.txt").unwrap() {
            PreplanOutcome::ToolCall(call) => {
                assert_eq!(call.function.name, "copy_file");
                let args: serde_json::Value = serde_json::from_str(&call.function.arguments).unwrap();
                assert_eq!(args["source"], "a.txt");
                assert_eq!(args["destination"], "b.txt");
            }
            _ => panic!("expected a tool call"),
        }
    }

    #[test]
    fn test_explain_file_pattern() {
        match try_preplan("What does main.py do?").unwrap() {
            PreplanOutcome::ToolCall(call) => {
                assert_eq!(call.function.name, "read_file");
            }
            _ => panic!("expected a tool call"),
        }
    }

    #[test]
    fn test_unmatched_falls_through() {
        assert!(try_preplan("please refactor the authentication module").is_none());
    }
}
