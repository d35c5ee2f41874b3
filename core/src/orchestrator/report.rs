use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::validate::ValidationResult;

/// Terminal summary of one run. Built once, when the loop reaches `Done`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub run_id: String,
    pub goal: Option<String>,
    pub iterations: u32,

    /// Task names in the order they completed.
    pub completed: Vec<String>,

    /// Task names in the order they failed.
    pub failed: Vec<String>,

    /// Tasks that never reached a terminal state, in resolved order.
    pub pending: Vec<String>,

    pub final_validation: Option<ValidationResult>,
    pub success: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ExecutionReport {
    /// At least one task completed and the last validation has passing tests and security.
    pub fn compute_success(completed: &[String], last: Option<&ValidationResult>) -> bool {
        !completed.is_empty() && last.map_or(true, |v| v.tests_passed && v.security_passed)
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
