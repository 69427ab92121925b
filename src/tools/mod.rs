//! Tools module - the annotation-driven tool catalog available to the
//! planner and the coding/verification sub-agents.
//!
//! Each tool is a self-contained type implementing the `Tool` trait and
//! carrying a `ToolMetadata` annotation describing which task types it
//! serves, what side effects it has, and what ambient context it needs.
//! Tools are registered into a `ToolRegistry`, which the dispatcher
//! (`dispatcher::run_tool_stage`) consults to augment, guard, and execute
//! batches of calls.
//!
//! ## Adding a new tool
//!
//! 1. Implement the `Tool` trait in the appropriate file under `src/tools/`.
//! 2. Give it a `metadata()` override describing its scenarios/side
//!    effects/guards.
//! 3. Register an instance in `build_default_registry`.

pub mod traits;
pub mod registry;
pub mod schema;
pub mod sandbox_guard;
pub mod dispatcher;
pub mod filesystem;
pub mod structured;
pub mod python_ast;
pub mod markdown;
pub mod git;
pub mod execution;
pub mod linting;
pub mod search;
pub mod meta;

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::sandbox::CodeExecutor;

pub use traits::{Tool, ToolMetadata, ToolResult};
pub use registry::{make_tool_call, ToolRegistry};

use filesystem::{
    AppendFileTool, CopyFileTool, DeleteFileTool, FindFilesTool, FsContext, GrepFilesTool, LineCountTool,
    ListFilesTool, MoveFileTool, ReadFileTool, ReadFilesTool, ReplaceInFileTool, WriteFileTool,
};
use git::{GitCommitTool, GitContext, GitDiffTool, GitStageAllTool, GitStatusTool};
use linting::{LintFilesTool, LintPythonTreeTool, Linter};
use markdown::MarkdownOutlineTool;
use meta::{BuildVerificationResponseTool, ClarifyTool, DoneTool, TaskCompleteTool};
use python_ast::{PythonAstDependenciesMultifileTool, PythonAstDependenciesTool};
use search::{SearchBackend, WebSearchTool};
use structured::{
    ReadIniTool, ReadJsonTool, ReadYamlTool, SetIniValueTool, SetJsonValueTool, SetYamlValueTool, WriteIniTool,
    WriteJsonTool, WriteYamlTool,
};
use execution::{RunPythonFileTool, RunPytestTool};

/// Build the registry every run wires up: the full filesystem/structured-data/
/// git/execution/meta catalog, plus the two optional backends (`Linter`,
/// `SearchBackend`) a host application may supply.
pub fn build_default_registry(
    root: PathBuf,
    config: Arc<Config>,
    executor: Arc<dyn CodeExecutor>,
    linter: Option<Arc<dyn Linter>>,
    search_backend: Option<Arc<dyn SearchBackend>>,
) -> ToolRegistry {
    let fs = FsContext::new(root.clone(), config.clone());
    let gitc = GitContext::new(root, config);
    let mut registry = ToolRegistry::new();

    registry.register(ReadFileTool(fs.clone()));
    registry.register(WriteFileTool(fs.clone()));
    registry.register(AppendFileTool(fs.clone()));
    registry.register(CopyFileTool(fs.clone()));
    registry.register(MoveFileTool(fs.clone()));
    registry.register(DeleteFileTool(fs.clone()));
    registry.register(LineCountTool(fs.clone()));
    registry.register(ReadFilesTool(fs.clone()));
    registry.register(ReplaceInFileTool(fs.clone()));
    registry.register(ListFilesTool(fs.clone()));
    registry.register(FindFilesTool(fs.clone()));
    registry.register(GrepFilesTool(fs.clone()));

    registry.register(ReadJsonTool(fs.clone()));
    registry.register(WriteJsonTool(fs.clone()));
    registry.register(SetJsonValueTool(fs.clone()));
    registry.register(ReadYamlTool(fs.clone()));
    registry.register(WriteYamlTool(fs.clone()));
    registry.register(SetYamlValueTool(fs.clone()));
    registry.register(ReadIniTool(fs.clone()));
    registry.register(WriteIniTool(fs.clone()));
    registry.register(SetIniValueTool(fs.clone()));

    registry.register(PythonAstDependenciesTool(fs.clone()));
    registry.register(PythonAstDependenciesMultifileTool(fs.clone()));
    registry.register(MarkdownOutlineTool(fs.clone()));

    registry.register(GitStatusTool(gitc.clone()));
    registry.register(GitDiffTool(gitc.clone()));
    registry.register(GitStageAllTool(gitc.clone()));
    registry.register(GitCommitTool(gitc));

    registry.register(RunPythonFileTool { fs: fs.clone(), executor: executor.clone() });
    registry.register(RunPytestTool { fs: fs.clone() });

    registry.register(LintPythonTreeTool { linter: linter.clone() });
    registry.register(LintFilesTool { linter });
    registry.register(WebSearchTool { backend: search_backend });

    registry.register(ClarifyTool);
    registry.register(DoneTool);
    registry.register(TaskCompleteTool);
    registry.register(BuildVerificationResponseTool);

    registry
}
