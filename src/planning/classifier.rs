//! Phase 1: quick pattern-based classifier
//!
//! One `Strategy` per recognized `TaskType`; each scores the latest human
//! message independently and the highest score wins, with a fixed tie-break
//! order. No LLM call is made.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::graph::state::{ClassificationResult, TaskType};

/// A strategy's verdict for one task type.
struct ScoreContribution {
    score: f32,
    reasoning: String,
}

/// One scoring strategy, one per classifiable `TaskType`.
trait Strategy: Send + Sync {
    fn task_type(&self) -> TaskType;
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution;
}

/// Precomputed facts about the latest human message, shared across strategies.
struct MessageContext {
    lowered: String,
    words: HashSet<String>,
    detected_files: Vec<String>,
    has_code_file: bool,
}

static FILE_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"@?([\w./-]+\.(?:py|js|ts|tsx|jsx|json|yaml|yml|md|txt|html|css|rs|go))\b"#).unwrap()
});
static QUOTED_PATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[`"']([\w./-]+\.\w+)[`"']"#).unwrap());

const COMMAND_PREFIXES: &[&str] = &["python", "python3", "node", "npm", "cargo", "go", "bash", "sh"];
const CODE_EXTENSIONS: &[&str] = &["py", "js", "ts", "tsx", "jsx", "rs", "go", "java", "c", "cpp", "h"];

fn extract_files(message: &str) -> Vec<String> {
    let mut files = Vec::new();
    let tokens: Vec<&str> = message.split_whitespace().collect();

    for (i, tok) in tokens.iter().enumerate() {
        let clean = tok.trim_start_matches('@').trim_matches(',');
        if i > 0 {
            let prev = tokens[i - 1].to_lowercase();
            if COMMAND_PREFIXES.contains(&prev.as_str()) {
                continue;
            }
        }
        if FILE_TOKEN_RE.is_match(clean) {
            if let Some(caps) = FILE_TOKEN_RE.captures(clean) {
                files.push(caps[1].to_string());
            }
        }
    }

    for caps in QUOTED_PATH_RE.captures_iter(message) {
        files.push(caps[1].to_string());
    }

    files.sort();
    files.dedup();
    files
}

impl MessageContext {
    fn new(message: &str) -> Self {
        let lowered = message.to_lowercase();
        let words = lowered.split_whitespace().map(|w| w.to_string()).collect();
        let detected_files = extract_files(message);
        let has_code_file = detected_files
            .iter()
            .any(|f| CODE_EXTENSIONS.iter().any(|ext| f.ends_with(&format!(".{}", ext))));

        MessageContext { lowered, words, detected_files, has_code_file }
    }

    fn contains_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.lowered.contains(n))
    }
}

struct GreetingStrategy;
impl Strategy for GreetingStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::Greeting
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let greetings = ["hi", "hello", "hey", "thanks", "thank you", "good morning"];
        if ctx.words.len() <= 4 && ctx.contains_any(&greetings) {
            ScoreContribution { score: 0.95, reasoning: "short greeting phrase".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "no greeting markers".into() }
        }
    }
}

struct FileOperationStrategy;
impl Strategy for FileOperationStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::FileOperation
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let verbs = ["copy", "move", "delete", "rename", "write", "append", "read", "list files"];
        if ctx.contains_any(&verbs) && !ctx.detected_files.is_empty() {
            ScoreContribution { score: 0.9, reasoning: "imperative file verb with a referenced path".into() }
        } else if ctx.contains_any(&verbs) {
            ScoreContribution { score: 0.5, reasoning: "imperative file verb without a clear path".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "no file-operation verb".into() }
        }
    }
}

struct ExplanationStrategy;
impl Strategy for ExplanationStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::Explanation
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let markers = ["what does", "explain", "describe", "summarize", "how does"];
        if ctx.contains_any(&markers) {
            let score = if !ctx.detected_files.is_empty() { 0.85 } else { 0.6 };
            ScoreContribution { score, reasoning: "explanatory question".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "not an explanatory question".into() }
        }
    }
}

struct WebSearchStrategy;
impl Strategy for WebSearchStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::WebSearch
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let markers = ["search the web", "look up", "google", "latest version of", "current price of"];
        if ctx.contains_any(&markers) {
            ScoreContribution { score: 0.85, reasoning: "explicit web-search request".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "no web-search markers".into() }
        }
    }
}

struct CodeFixStrategy;
impl Strategy for CodeFixStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::CodeFix
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let markers = ["fix", "bug", "broken", "error", "crash", "doesn't work", "not working"];
        if ctx.contains_any(&markers) {
            let score = if ctx.has_code_file { 0.8 } else { 0.6 };
            ScoreContribution { score, reasoning: "bug-fix vocabulary".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "no bug-fix vocabulary".into() }
        }
    }
}

struct CodeGenerationStrategy;
impl Strategy for CodeGenerationStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::CodeGeneration
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let markers = ["write a function", "implement", "create a", "add a feature", "generate code"];
        if ctx.contains_any(&markers) {
            ScoreContribution { score: 0.7, reasoning: "generation vocabulary".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "no generation vocabulary".into() }
        }
    }
}

struct ComplexRefactorStrategy;
impl Strategy for ComplexRefactorStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::ComplexRefactor
    }
    fn compute_score(&self, ctx: &MessageContext) -> ScoreContribution {
        let markers = ["refactor", "restructure", "split into modules", "rename across", "extract"];
        if ctx.contains_any(&markers) {
            ScoreContribution { score: 0.65, reasoning: "refactor vocabulary".into() }
        } else {
            ScoreContribution { score: 0.0, reasoning: "no refactor vocabulary".into() }
        }
    }
}

struct UnknownStrategy;
impl Strategy for UnknownStrategy {
    fn task_type(&self) -> TaskType {
        TaskType::Unknown
    }
    fn compute_score(&self, _ctx: &MessageContext) -> ScoreContribution {
        // Always-present floor so some candidate exists even for gibberish input.
        ScoreContribution { score: 0.1, reasoning: "default floor".into() }
    }
}

fn strategies() -> Vec<Box<dyn Strategy>> {
    vec![
        Box::new(GreetingStrategy),
        Box::new(FileOperationStrategy),
        Box::new(ExplanationStrategy),
        Box::new(WebSearchStrategy),
        Box::new(CodeFixStrategy),
        Box::new(CodeGenerationStrategy),
        Box::new(ComplexRefactorStrategy),
        Box::new(UnknownStrategy),
    ]
}

/// Run every strategy against `message` and return the classification with
/// the highest score, tie-broken by `TaskType::tie_break_rank`.
pub fn classify(message: &str) -> ClassificationResult {
    let ctx = MessageContext::new(message);

    let mut candidates: Vec<(TaskType, f32, String)> = strategies()
        .iter()
        .map(|s| {
            let contribution = s.compute_score(&ctx);
            (s.task_type(), contribution.score, contribution.reasoning)
        })
        .collect();

    // Greeting short-circuits all code-related heuristics even when e.g.
    // "thanks for fixing" contains "fix".
    let greeting_score = candidates
        .iter()
        .find(|(t, _, _)| *t == TaskType::Greeting)
        .map(|(_, s, _)| *s)
        .unwrap_or(0.0);
    if greeting_score >= 0.8 {
        candidates.retain(|(t, _, _)| matches!(t, TaskType::Greeting | TaskType::Unknown));
    }

    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap()
            .then_with(|| a.0.tie_break_rank().cmp(&b.0.tie_break_rank()))
    });

    let (task_type, confidence, reasoning) = candidates[0].clone();

    let detected_action = if task_type == TaskType::FileOperation {
        ["copy", "move", "delete", "write", "append", "read"]
            .iter()
            .find(|v| ctx.lowered.contains(**v))
            .map(|v| v.to_string())
    } else {
        None
    };

    ClassificationResult {
        task_type,
        confidence: confidence.clamp(0.0, 1.0),
        detected_files: ctx.detected_files,
        detected_action,
        reasoning,
        candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_classified_confidently() {
        let result = classify("hello there");
        assert_eq!(result.task_type, TaskType::Greeting);
        assert!(result.is_confident());
    }

    #[test]
    fn test_greeting_overrides_fix_mention() {
        let result = classify("thanks for fixing that");
        assert_eq!(result.task_type, TaskType::Greeting);
    }

    #[test]
    fn test_file_operation_detects_path() {
        let result = classify("copy a.txt to b.txt");
        assert_eq!(result.task_type, TaskType::FileOperation);
        assert!(result.detected_files.contains(&"a.txt".to_string()));
        assert_eq!(result.detected_action.as_deref(), Some("copy"));
    }

    #[test]
    fn test_explanation_with_file() {
        let result = classify("What does main.py do?");
        assert_eq!(result.task_type, TaskType::Explanation);
        assert!(result.detected_files.contains(&"main.py".to_string()));
    }

    #[test]
    fn test_gibberish_falls_to_unknown() {
        let result = classify("asdkjfh qweoiru");
        assert_eq!(result.task_type, TaskType::Unknown);
    }

    #[test]
    fn test_command_token_not_treated_as_file_reference_target() {
        // "main.py" here is an argument to "python", not an imperative target,
        // but it is still a legitimate file reference for explanation purposes.
        let result = classify("run python main.py and tell me what happens");
        assert!(result.detected_files.contains(&"main.py".to_string()));
    }
}
