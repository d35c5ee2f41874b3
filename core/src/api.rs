//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `genius_core::api` instead of reaching into internal modules.

pub use crate::collab::{
    Editor, Linter, PlanningDelegate, Repository, RiskyConstruct, SearchProvider,
    SecurityFinding, SecurityScanner, TestRunner,
};
pub use crate::config::{
    load_default, load_file, AppConfig, EditorConfig, LoggingConfig, OrchestratorConfig,
    PlannerConfig, RepoConfig, SearchConfig, ValidationConfig,
};
pub use crate::context::{Services, ServicesFactory};
pub use crate::error::{ErrorCode, GeniusError, PlanParseError};
pub use crate::executor::Executor;
pub use crate::feedback::{ContextMemory, Decision, FeedbackController};
pub use crate::orchestrator::{ExecutionReport, LoopPhase, Orchestrator};
pub use crate::planner::{Planner, DEFAULT_GOAL};
pub use crate::progress::ProgressMonitor;
pub use crate::task::{
    resolve, Effort, ForcedTask, Issue, IssueCategory, RepoContext, Resolution, Severity, Task, TaskGraph,
    TaskId, TaskKind,
};
pub use crate::validate::{format_findings, PatternScanner, ValidationResult, Validator};
