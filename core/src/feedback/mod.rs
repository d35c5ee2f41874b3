//! Retry-or-abandon decisions and the error context carried into retries.

mod memory;

use std::collections::HashMap;

use crate::error::GeniusError;
use crate::task::Task;
use crate::validate::ValidationResult;

pub use memory::ContextMemory;

const NO_DIAGNOSTICS: &str = "validation failed without diagnostics";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep the task in the ready pool under its original priority.
    Retry,
    /// Move the task to the failed set for good.
    Abandon,
}

pub struct FeedbackController {
    max_retries: u32,

    /// Task name -> error context for that task's next attempt
    contexts: HashMap<String, String>,
}

impl FeedbackController {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            contexts: HashMap::new(),
        }
    }

    pub fn on_failure(
        &mut self,
        task: &mut Task,
        result: &ValidationResult,
        memory: &mut ContextMemory,
    ) -> Decision {
        let context = result
            .error_context()
            .unwrap_or_else(|| NO_DIAGNOSTICS.to_string());
        let failure = GeniusError::ValidationFailure(result.failed_checks().join(", "));

        memory.push_error(context.clone());

        if task.retry_count < self.max_retries {
            task.retry_count += 1;
            self.contexts.insert(task.name.clone(), context);
            tracing::warn!(
                target: "genius.feedback",
                phase = "feedback",
                action = "retry",
                reasoning = "validation failed; retry budget remains",
                task = %task.name,
                retry_count = task.retry_count,
                max_retries = self.max_retries,
                "{}",
                failure
            );
            Decision::Retry
        } else {
            self.contexts.remove(&task.name);
            tracing::warn!(
                target: "genius.feedback",
                phase = "feedback",
                action = "abandon",
                reasoning = "validation failed with the retry budget exhausted",
                task = %task.name,
                retry_count = task.retry_count,
                "{}",
                failure
            );
            Decision::Abandon
        }
    }

    pub fn on_success(&mut self, task_name: &str) {
        if self.contexts.remove(task_name).is_some() {
            tracing::debug!(target: "genius.feedback", task = %task_name, "cleared error context");
        }
    }

    /// Drop any stored context for a task that will not run again.
    pub fn forget(&mut self, task_name: &str) {
        self.contexts.remove(task_name);
    }

    pub fn context_for(&self, task_name: &str) -> Option<&str> {
        self.contexts.get(task_name).map(String::as_str)
    }
}
