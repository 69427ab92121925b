//! Tool dispatcher: augments, fuses, normalizes, guards, and executes one
//! batch of tool calls emitted by a planning or sub-agent step.

use std::collections::VecDeque;
use std::path::Path;

use crate::core::provider::{FunctionCall, ToolCall};
use crate::error::{Error, Result};
use crate::graph::message::Message;
use crate::graph::state::{AgentOutcome, AgentState, OutcomeStatus, ToolGuard};

use super::registry::ToolRegistry;
use super::sandbox_guard::{is_secret_path, resolve_path, test_overwrite_allowed};

/// Run one full dispatcher pass over `state.tool_calls`, appending a
/// `Message::Tool` per call and clearing the pending call list.
pub async fn run_tool_stage(state: &mut AgentState, registry: &ToolRegistry) -> Result<()> {
    let calls = std::mem::take(&mut state.tool_calls);
    if calls.is_empty() {
        return Ok(());
    }

    let mut queue: VecDeque<ToolCall> = fuse_consecutive_reads(calls).into();
    augment_with_followups(&mut queue);
    for call in queue.iter_mut() {
        normalize_args(call);
    }

    let root = crate::config::workspace_dir();
    let human_message = state.latest_human_message().to_string();

    let mut processed = 0usize;
    let mut any_failure = false;
    let mut last_display = String::new();
    // `queue` can grow mid-pass (the list_files -> python_ast_dependencies_multifile
    // follow-up, step 5 of the dispatcher algorithm), so this is not a plain for loop.
    while let Some(call) = queue.pop_front() {
        processed += 1;
        if processed > 256 {
            // A pathological augmentation loop should never happen in practice;
            // this is a hard backstop, not a tuned limit.
            break;
        }

        let outcome = match check_guards(&call, registry, state, &root, &human_message) {
            Ok(()) => registry.execute(&call).await,
            Err(guard_err) => Ok(super::traits::ToolResult::failure(guard_err.to_string())),
        };

        match outcome {
            Ok(result) => {
                let display = result.to_display_string();
                if call.function.name == "list_files" && result.success {
                    maybe_inject_multifile_deps(&mut queue, &call, &display);
                }
                any_failure |= !result.success;
                last_display = display.clone();
                state.messages.push(Message::tool(call.id.clone(), call.function.name.clone(), display));
            }
            Err(e) => {
                any_failure = true;
                last_display = format!("{} failed: {}", call.function.name, e);
                state.messages.push(Message::tool(call.id.clone(), call.function.name.clone(), last_display.clone()));
            }
        }
    }

    state.agent_outcomes.push(AgentOutcome {
        agent: "tools".to_string(),
        status: if any_failure { OutcomeStatus::Failed } else { OutcomeStatus::Success },
        result: last_display,
        messages: Vec::new(),
        next_step_suggestion: None,
    });

    Ok(())
}

/// Strip a leading `@` from string and array-of-string arguments — `@`-paths
/// are a chat-UI convention, not part of the tool's own argument grammar.
fn normalize_args(call: &mut ToolCall) {
    let Ok(mut value) = serde_json::from_str::<serde_json::Value>(&call.function.arguments) else {
        return;
    };
    if let Some(obj) = value.as_object_mut() {
        for v in obj.values_mut() {
            strip_at_prefix(v);
        }
    }
    call.function.arguments = value.to_string();
}

fn strip_at_prefix(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::String(s) => {
            if let Some(stripped) = s.strip_prefix('@') {
                *s = stripped.to_string();
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                strip_at_prefix(item);
            }
        }
        _ => {}
    }
}

/// Collapse runs of ≥2 consecutive `read_file` calls into one `read_files`.
fn fuse_consecutive_reads(calls: Vec<ToolCall>) -> Vec<ToolCall> {
    let mut fused = Vec::new();
    let mut pending_paths: Vec<String> = Vec::new();

    let flush = |fused: &mut Vec<ToolCall>, pending: &mut Vec<String>| {
        if pending.len() >= 2 {
            fused.push(make_call("read_files", serde_json::json!({"paths": pending.clone()})));
        } else {
            for path in pending.drain(..) {
                fused.push(make_call("read_file", serde_json::json!({"path": path})));
            }
        }
        pending.clear();
    };

    for call in calls {
        if call.function.name == "read_file" {
            if let Ok(args) = serde_json::from_str::<serde_json::Value>(&call.function.arguments) {
                if let Some(path) = args.get("path").and_then(|p| p.as_str()) {
                    pending_paths.push(path.to_string());
                    continue;
                }
            }
        }
        flush(&mut fused, &mut pending_paths);
        fused.push(call);
    }
    flush(&mut fused, &mut pending_paths);
    fused
}

/// After every `read_file(path=*.py)` not already followed by a matching
/// `python_ast_dependencies`, insert one; likewise for Markdown files and
/// `markdown_outline`.
fn augment_with_followups(queue: &mut VecDeque<ToolCall>) {
    let mut augmented = VecDeque::with_capacity(queue.len());
    let mut iter = queue.drain(..).peekable();

    while let Some(call) = iter.next() {
        let path = (call.function.name == "read_file")
            .then(|| serde_json::from_str::<serde_json::Value>(&call.function.arguments).ok())
            .flatten()
            .and_then(|v| v.get("path").and_then(|p| p.as_str()).map(|s| s.to_string()));

        augmented.push_back(call);

        if let Some(path) = path {
            let next_is_followup = iter.peek().is_some_and(|next| {
                matches!(next.function.name.as_str(), "python_ast_dependencies" | "markdown_outline")
            });
            if !next_is_followup {
                if path.ends_with(".py") {
                    augmented.push_back(make_call("python_ast_dependencies", serde_json::json!({"path": path})));
                } else if path.ends_with(".md") {
                    augmented.push_back(make_call("markdown_outline", serde_json::json!({"path": path})));
                }
            }
        }
    }

    *queue = augmented;
}

/// Step 5 of the dispatcher algorithm: `list_files` returning ≤5 Python
/// files with no multi-file dependency call already queued gets one
/// inserted right after it.
fn maybe_inject_multifile_deps(queue: &mut VecDeque<ToolCall>, _list_call: &ToolCall, listing: &str) {
    let python_files: Vec<String> = listing.lines().filter(|l| l.ends_with(".py")).map(|s| s.to_string()).collect();
    if python_files.is_empty() || python_files.len() > 5 {
        return;
    }
    let already_queued = queue.iter().any(|c| c.function.name == "python_ast_dependencies_multifile");
    if already_queued {
        return;
    }
    queue.push_front(make_call("python_ast_dependencies_multifile", serde_json::json!({"paths": python_files})));
}

fn make_call(name: &str, args: serde_json::Value) -> ToolCall {
    ToolCall {
        id: uuid::Uuid::new_v4().to_string(),
        call_type: "function".to_string(),
        function: FunctionCall { name: name.to_string(), arguments: args.to_string() },
    }
}

/// Apply the secret-read and test-overwrite guards ahead of execution. The
/// path sandbox itself (`PathEscapesRoot`) is enforced again inside each
/// tool's own `resolve_path` call; this pass exists to fail fast with a
/// guard-specific error before a tool even runs.
fn check_guards(call: &ToolCall, registry: &ToolRegistry, state: &AgentState, root: &Path, human_message: &str) -> Result<()> {
    let Some(meta) = registry.metadata_of(&call.function.name) else {
        return Ok(());
    };
    let Ok(args) = serde_json::from_str::<serde_json::Value>(&call.function.arguments) else {
        return Ok(());
    };

    if let Some(path_str) = args.get("path").and_then(|p| p.as_str()) {
        let resolved = resolve_path(path_str, root, state.config.runtime.allow_outside_workspace)?;

        let is_read = matches!(call.function.name.as_str(), "read_file" | "read_files" | "read_json" | "read_yaml" | "read_ini");
        if is_read && is_secret_path(&resolved, &state.config.tools.secret_globs) && !state.config.tools.allow_read_secrets {
            return Err(Error::SecretGuard(format!("refusing to read secret-like path: {}", path_str)));
        }

        if meta.guards.contains(&ToolGuard::TestOverwrite) {
            let exists = resolved.exists();
            if !test_overwrite_allowed(&resolved, exists, human_message) {
                return Err(Error::TestOverwriteGuard(format!(
                    "refusing to overwrite test file {} without an explicit request",
                    path_str
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuse_collapses_consecutive_reads() {
        let calls = vec![
            make_call("read_file", serde_json::json!({"path": "a.py"})),
            make_call("read_file", serde_json::json!({"path": "b.py"})),
        ];
        let fused = fuse_consecutive_reads(calls);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].function.name, "read_files");
    }

    #[test]
    fn test_single_read_is_not_fused() {
        let calls = vec![make_call("read_file", serde_json::json!({"path": "a.py"}))];
        let fused = fuse_consecutive_reads(calls);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].function.name, "read_file");
    }

    #[test]
    fn test_augment_inserts_python_ast_dependencies() {
        let mut queue: VecDeque<ToolCall> = vec![make_call("read_file", serde_json::json!({"path": "a.py"}))].into();
        augment_with_followups(&mut queue);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue[1].function.name, "python_ast_dependencies");
    }

    #[test]
    fn test_augment_skips_when_followup_already_present() {
        let mut queue: VecDeque<ToolCall> = vec![
            make_call("read_file", serde_json::json!({"path": "a.py"})),
            make_call("python_ast_dependencies", serde_json::json!({"path": "a.py"})),
        ]
        .into();
        augment_with_followups(&mut queue);
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_normalize_strips_leading_at() {
        let mut call = make_call("read_file", serde_json::json!({"path": "@a.py"}));
        normalize_args(&mut call);
        let args: serde_json::Value = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(args["path"], "a.py");
    }
}
