//! Shared state threaded through every node of the orchestration graph

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::provider::ToolCall;
use crate::graph::message::Message;

/// Closed set of classification labels a human request can be routed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Greeting,
    FileOperation,
    CodeFix,
    CodeGeneration,
    CodeValidation,
    ResultVerification,
    Documentation,
    Explanation,
    ComplexRefactor,
    WebSearch,
    CodeAnalysis,
    MetaTool,
    Unknown,
}

impl TaskType {
    /// Deterministic tie-break order used by the classifier when two
    /// strategies produce the same score.
    pub fn tie_break_rank(&self) -> u8 {
        match self {
            TaskType::Greeting => 0,
            TaskType::FileOperation => 1,
            TaskType::Explanation => 2,
            TaskType::WebSearch => 3,
            TaskType::CodeFix => 4,
            TaskType::CodeGeneration => 5,
            TaskType::ComplexRefactor => 6,
            TaskType::CodeValidation => 7,
            TaskType::ResultVerification => 8,
            TaskType::Documentation => 9,
            TaskType::CodeAnalysis => 10,
            TaskType::MetaTool => 11,
            TaskType::Unknown => 12,
        }
    }
}

/// A side effect a tool can have beyond reading the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSideEffect {
    FileMutation,
    CodeExecution,
    StateChange,
    Network,
}

/// Which ambient resource a tool needs from the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolContext {
    Filesystem,
    Search,
    Config,
}

/// A pre-invocation check attached to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolGuard {
    TestOverwrite,
}

/// Phase-1 classifier verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub task_type: TaskType,
    pub confidence: f32,
    pub detected_files: Vec<String>,
    pub detected_action: Option<String>,
    pub reasoning: String,
    pub candidates: Vec<(TaskType, f32, String)>,
}

impl ClassificationResult {
    /// Confident classifications may resolve without the LLM planner.
    pub fn is_confident(&self) -> bool {
        self.confidence >= 0.8
    }

    /// Whether this task type is one of the four the spec allows to
    /// short-circuit straight from a confident classification.
    pub fn may_resolve_without_planner(&self) -> bool {
        if !self.is_confident() {
            return false;
        }
        match self.task_type {
            TaskType::Greeting | TaskType::WebSearch | TaskType::FileOperation => true,
            TaskType::Explanation => !self.detected_files.is_empty(),
            _ => false,
        }
    }
}

/// Outcome of one sub-agent or tool-dispatch pass, appended to `AgentState.agent_outcomes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub agent: String,
    pub status: OutcomeStatus,
    pub result: String,
    pub messages: Vec<Message>,
    pub next_step_suggestion: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Error,
}

/// What the plan/review node decided should happen next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    Delegate,
    Tool,
    Respond,
    Coding,
    Verification,
    Continue,
    End,
}

/// The single shared record every graph node consumes and produces.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub messages: Vec<Message>,
    pub iterations: u32,
    pub llm_calls: u32,
    pub max_llm_calls: u32,
    pub agent_outcomes: Vec<AgentOutcome>,
    pub selected_agent: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub next_action: NextAction,
    pub classification: Option<ClassificationResult>,
    pub config: Arc<Config>,
    pub error_hashes: HashSet<[u8; 32]>,
    pub verbose: bool,
    pub final_response: Option<String>,
    pub verification_loops: u32,
}

impl AgentState {
    /// Create the initial state for a run: one human message, zero counters.
    pub fn new(task: impl Into<String>, config: Arc<Config>) -> Self {
        let max_llm_calls = config.runtime.max_llm_calls;
        AgentState {
            messages: vec![Message::human(task)],
            iterations: 0,
            llm_calls: 0,
            max_llm_calls,
            agent_outcomes: Vec::new(),
            selected_agent: None,
            tool_calls: Vec::new(),
            next_action: NextAction::Delegate,
            classification: None,
            config,
            error_hashes: HashSet::new(),
            verbose: false,
            final_response: None,
            verification_loops: 0,
        }
    }

    /// The most recent human message's text, or empty string if none exists.
    pub fn latest_human_message(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find_map(|m| if let Message::Human { content } = m { Some(content.as_str()) } else { None })
            .unwrap_or("")
    }

    /// Enforced before every LLM call: `llm_calls <= max_llm_calls`.
    pub fn check_llm_budget(&self) -> crate::Result<()> {
        if self.llm_calls >= self.max_llm_calls {
            return Err(crate::Error::LlmCallLimitExceeded(self.max_llm_calls));
        }
        Ok(())
    }

    pub fn record_llm_call(&mut self) {
        self.llm_calls += 1;
    }

    pub fn last_agent_outcome(&self) -> Option<&AgentOutcome> {
        self.agent_outcomes.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_new_state_seeds_human_message() {
        let state = AgentState::new("hello", Arc::new(Config::default()));
        assert_eq!(state.messages.len(), 1);
        assert!(state.messages[0].is_human());
        assert_eq!(state.iterations, 0);
        assert_eq!(state.llm_calls, 0);
    }

    #[test]
    fn test_llm_budget_enforced_before_call() {
        let mut state = AgentState::new("hi", Arc::new(Config::default()));
        state.max_llm_calls = 1;
        assert!(state.check_llm_budget().is_ok());
        state.record_llm_call();
        assert!(state.check_llm_budget().is_err());
    }

    #[test]
    fn test_classification_confidence_threshold() {
        let result = ClassificationResult {
            task_type: TaskType::Greeting,
            confidence: 0.8,
            detected_files: vec![],
            detected_action: None,
            reasoning: String::new(),
            candidates: vec![],
        };
        assert!(result.is_confident());
    }
}
