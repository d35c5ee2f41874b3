use serde::Serialize;

use crate::validate::ValidationResult;

const HISTORY_LIMIT: usize = 20;

/// Diagnostics remembered across cycles of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextMemory {
    /// Error contexts carried so far, oldest first. Can be seeded before a run.
    pub previous_errors: Vec<String>,

    /// Lint payload of the most recent validation pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_lint_output: Option<String>,

    /// Test payload of the most recent validation pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_test_output: Option<String>,
}

impl ContextMemory {
    pub fn with_previous_errors<I, S>(errors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut memory = Self::default();
        for e in errors {
            memory.push_error(e);
        }
        memory
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        let error = error.into();
        if error.trim().is_empty() {
            return;
        }
        self.previous_errors.push(error);
        if self.previous_errors.len() > HISTORY_LIMIT {
            let excess = self.previous_errors.len() - HISTORY_LIMIT;
            self.previous_errors.drain(..excess);
        }
    }

    /// Replace the recorded lint/test payloads with the ones from `result`.
    pub fn record_validation(&mut self, result: &ValidationResult) {
        self.last_lint_output = result.lint_output.clone();
        self.last_test_output = result.test_output.clone();
    }
}
