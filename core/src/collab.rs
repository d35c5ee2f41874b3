//! Narrow contracts for the black boxes the loop drives.
//!
//! Implementations live in `genius-plugins`; tests use in-memory fakes.
use async_trait::async_trait;
use serde::Serialize;

/// Applies an instruction message to the on-disk tree.
#[async_trait]
pub trait Editor: Send + Sync {
    fn name(&self) -> &str;
    async fn apply(&self, message: &str) -> anyhow::Result<()>;
}

/// Lints one file. `Ok(None)` means clean.
#[async_trait]
pub trait Linter: Send + Sync {
    fn name(&self) -> &str;
    async fn lint(&self, file: &str) -> anyhow::Result<Option<String>>;
}

/// Runs the test command. `Ok(None)` means the suite passed.
#[async_trait]
pub trait TestRunner: Send + Sync {
    fn name(&self) -> &str;
    async fn run_tests(&self, command: &str) -> anyhow::Result<Option<String>>;
}

/// Version-control view of the working tree plus the commit side effect.
#[async_trait]
pub trait Repository: Send + Sync {
    fn name(&self) -> &str;

    /// Tracked file paths, relative to the repository root.
    async fn tracked_files(&self) -> anyhow::Result<Vec<String>>;

    async fn is_dirty(&self) -> anyhow::Result<bool>;

    async fn commit(&self, message: &str) -> anyhow::Result<()>;

    async fn repo_map(&self) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

/// External planner: returns free text expected to hold one JSON array of tasks.
#[async_trait]
pub trait PlanningDelegate: Send + Sync {
    fn name(&self) -> &str;
    async fn complete(&self, system_prompt: &str, user_prompt: &str)
        -> anyhow::Result<Option<String>>;
}

/// Web search used to enrich instruction messages.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;
    fn is_available(&self) -> bool;
    async fn search_many(
        &self,
        queries: &[String],
        max_results_per_query: usize,
    ) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskyConstruct {
    DynamicEvaluation,
    ShellSubprocess,
    UnsafeDeserialization,
}

impl RiskyConstruct {
    pub fn describe(self) -> &'static str {
        match self {
            Self::DynamicEvaluation => "dynamic code evaluation",
            Self::ShellSubprocess => "shell-interpolating subprocess invocation",
            Self::UnsafeDeserialization => "unsafe deserialization",
        }
    }
}

/// One flagged file/construct pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityFinding {
    pub file: String,
    pub line: usize,
    pub construct: RiskyConstruct,
    pub snippet: String,
}

/// Static content check over source files, relative to the scanner's root.
#[async_trait]
pub trait SecurityScanner: Send + Sync {
    fn name(&self) -> &str;
    async fn scan(&self, files: &[String]) -> anyhow::Result<Vec<SecurityFinding>>;
}
