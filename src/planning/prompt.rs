//! System prompt construction for the Phase 2 LLM planner.

use super::prompt_builder::PromptBuilder;
use crate::graph::state::ClassificationResult;

const FILE_OP_TOOLS: &[&str] = &[
    "read_file", "write_file", "append_file", "copy_file", "move_file", "delete_file", "list_files", "find_files",
    "grep_files", "line_count",
];

const DECISION_SCHEMA: &str = r#"Respond with exactly one JSON object and nothing else:
{"action": "delegate"|"respond"|"tool"|"done", "agent": "agent:<name>"|"llm:<profile>"|null, "reasoning": "<why>", "response": "<text>"|null, "tool_calls": [{"tool": "<name>", "args": {}}]}"#;

const EXAMPLES: &str = concat!(
    "\"hi\" -> {\"action\":\"respond\",\"reasoning\":\"greeting\",\"response\":\"Hello! How can I help with your code today?\"}\n",
    "\"copy a.txt to b.txt\" -> {\"action\":\"tool\",\"reasoning\":\"direct file operation\",\"tool_calls\":[{\"tool\":\"copy_file\",\"args\":{\"source\":\"a.txt\",\"destination\":\"b.txt\"}}]}\n",
    "\"fix the bug in main.py\" -> {\"action\":\"delegate\",\"agent\":\"agent:codur-coding\",\"reasoning\":\"requires editing code\"}\n",
    "\"did that last change actually fix it?\" -> {\"action\":\"delegate\",\"agent\":\"agent:codur-verification\",\"reasoning\":\"needs to verify a prior change\"}",
);

/// Build the system prompt handed to the Phase 2 planner: the fixed base
/// sections (default agent, tool catalog, decision schema, examples) plus a
/// per-request `Task Focus` section when a file reference was detected.
pub fn build_planning_prompt(
    classification: &ClassificationResult,
    default_agent: &str,
    other_tool_names: &[String],
) -> String {
    let other_tools: Vec<&str> = other_tool_names
        .iter()
        .map(|s| s.as_str())
        .filter(|n| !FILE_OP_TOOLS.contains(n))
        .take(12)
        .collect();

    let mut prompt = PromptBuilder::new()
        .section(
            "Role",
            "You are the planning layer of a coding-agent orchestrator. Decide the single next action for the latest message.",
        )
        .section("Default agent", &format!("`{}` handles requests with no more specific match.", default_agent))
        .section("File-operation tools", &FILE_OP_TOOLS.join(", "))
        .section("Other available tools", &other_tools.join(", "))
        .section("Decision schema", DECISION_SCHEMA)
        .section("Examples", EXAMPLES)
        .build();

    if let Some(focus) = task_focus_section(classification) {
        prompt.push_str("\n\n");
        prompt.push_str(&focus);
    }

    prompt
}

fn task_focus_section(classification: &ClassificationResult) -> Option<String> {
    let path = classification.detected_files.first()?;
    let mut lines = vec![format!("## Task Focus\nThe user referenced `{}`.", path)];

    if path.ends_with(".py") {
        lines.push(format!(
            "This is a Python file: a `read_file` tool call on it should be followed by a `python_ast_dependencies` \
             call on the same path, e.g. {{\"tool\":\"read_file\",\"args\":{{\"path\":\"{p}\"}}}} then \
             {{\"tool\":\"python_ast_dependencies\",\"args\":{{\"path\":\"{p}\"}}}}.",
            p = path
        ));
    } else if path.ends_with(".md") {
        lines.push(format!(
            "This is a Markdown file: a `read_file` call on it pairs with a `markdown_outline` call on the same path."
        ));
    }

    lines.push(format!(
        "Classifier guess: {:?} (confidence {:.2}) — {}",
        classification.task_type, classification.confidence, classification.reasoning
    ));
    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::state::TaskType;

    fn classification(task_type: TaskType, files: Vec<&str>) -> ClassificationResult {
        ClassificationResult {
            task_type,
            confidence: 0.9,
            detected_files: files.into_iter().map(|s| s.to_string()).collect(),
            detected_action: None,
            reasoning: "test".to_string(),
            candidates: Vec::new(),
        }
    }

    #[test]
    fn test_prompt_includes_decision_schema_and_default_agent() {
        let prompt = build_planning_prompt(&classification(TaskType::Unknown, vec![]), "codur-coding", &[]);
        assert!(prompt.contains("codur-coding"));
        assert!(prompt.contains("\"action\""));
    }

    #[test]
    fn test_python_focus_mentions_ast_dependencies_followup() {
        let prompt = build_planning_prompt(&classification(TaskType::CodeFix, vec!["main.py"]), "codur-coding", &[]);
        assert!(prompt.contains("python_ast_dependencies"));
    }

    #[test]
    fn test_no_focus_section_without_detected_files() {
        let prompt = build_planning_prompt(&classification(TaskType::Unknown, vec![]), "codur-coding", &[]);
        assert!(!prompt.contains("Task Focus"));
    }
}
