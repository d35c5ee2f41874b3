use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of work a task represents; selects the instruction template handed to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    FeatureImplementation,
    FixTests,
    FixLint,
    FixSecurity,
    Improvement,
    Refactor,
    Documentation,
}

impl TaskKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FeatureImplementation => "feature_implementation",
            Self::FixTests => "fix_tests",
            Self::FixLint => "fix_lint",
            Self::FixSecurity => "fix_security",
            Self::Improvement => "improvement",
            Self::Refactor => "refactor",
            Self::Documentation => "documentation",
        }
    }

    /// Kinds whose instructions benefit from outside context (web search).
    pub fn is_exploratory(self) -> bool {
        matches!(self, Self::FeatureImplementation | Self::Improvement)
    }

    /// Kinds that repair a pre-existing issue rather than advance the goal.
    pub fn is_fix(self) -> bool {
        matches!(self, Self::FixTests | Self::FixLint | Self::FixSecurity)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "feature_implementation" | "feature" => Ok(Self::FeatureImplementation),
            "fix_tests" | "fix_test" => Ok(Self::FixTests),
            "fix_lint" => Ok(Self::FixLint),
            "fix_security" => Ok(Self::FixSecurity),
            "improvement" => Ok(Self::Improvement),
            "refactor" => Ok(Self::Refactor),
            "documentation" | "docs" => Ok(Self::Documentation),
            _ => Err(format!("unknown task type '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    #[default]
    Medium,
    High,
}

impl FromStr for Effort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown effort '{}'", other)),
        }
    }
}

/// One schedulable unit of work.
///
/// `name`, `kind` and `details` are fixed once the planner emits the task;
/// `retry_count` is only ever changed by the feedback controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,

    pub kind: TaskKind,

    /// Lower is more urgent.
    pub priority: u32,

    pub details: String,

    /// Names of tasks that must complete before this one may start.
    #[serde(default)]
    pub dependencies: Vec<String>,

    #[serde(default)]
    pub retry_count: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default)]
    pub estimated_effort: Effort,

    /// Set by the planning delegate when a fix is a prerequisite of the goal.
    #[serde(default)]
    pub blocks_goal: bool,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        kind: TaskKind,
        priority: u32,
        details: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            priority,
            details: details.into(),
            dependencies: Vec::new(),
            retry_count: 0,
            file: None,
            estimated_effort: Effort::default(),
            blocks_goal: false,
        }
    }

    pub fn with_dependencies<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dep in deps {
            let dep = dep.into();
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Lint,
    Test,
    Security,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// A pre-existing problem in the repository known before planning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub category: IssueCategory,
    pub severity: Severity,
    pub details: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Issue {
    pub fn new(category: IssueCategory, severity: Severity, details: impl Into<String>) -> Self {
        Self {
            category,
            severity,
            details: details.into(),
            file: None,
        }
    }
}

/// Snapshot of the repository handed to the planner.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepoContext {
    pub tracked_files: Vec<String>,
    pub dirty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_map: Option<String>,
}
