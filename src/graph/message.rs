//! Tagged-variant conversation message
//!
//! Replaces the flat `{role, content, name, tool_call_id, tool_calls}` shape
//! with one variant per role, so a `Tool` message can't be constructed
//! without a `tool_call_id` and an `Ai` message's `tool_calls` don't leak
//! onto messages that never carry them.

use serde::{Deserialize, Serialize};

use crate::core::provider::ToolCall;

/// One entry in an `AgentState`'s append-only message list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System { content: String },
    Human { content: String },
    Ai {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System { content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Message::Human { content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Message::Ai { content: content.into(), tool_calls: None }
    }

    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Ai { content: content.into(), tool_calls: Some(tool_calls) }
    }

    pub fn tool(tool_call_id: impl Into<String>, name: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    /// The text content of any variant, for logging/summarization.
    pub fn content(&self) -> &str {
        match self {
            Message::System { content } => content,
            Message::Human { content } => content,
            Message::Ai { content, .. } => content,
            Message::Tool { content, .. } => content,
        }
    }

    /// Tool calls carried by an `Ai` message, if any.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match self {
            Message::Ai { tool_calls: Some(calls), .. } => Some(calls),
            _ => None,
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Message::Human { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_message_requires_id_and_name() {
        let msg = Message::tool("call-1", "read_file", "contents");
        match msg {
            Message::Tool { tool_call_id, name, content } => {
                assert_eq!(tool_call_id, "call-1");
                assert_eq!(name, "read_file");
                assert_eq!(content, "contents");
            }
            _ => panic!("expected Tool variant"),
        }
    }

    #[test]
    fn test_ai_without_tool_calls_serializes_without_field() {
        let msg = Message::ai("done");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("tool_calls").is_none());
    }
}
