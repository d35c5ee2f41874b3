use thiserror::Error;

/// Reasons a delegated planning response could not be turned into tasks.
///
/// Every variant triggers the rule-based fallback; none of them reach the caller.
#[derive(Error, Debug)]
pub enum PlanParseError {
    #[error("planning delegate returned no content")]
    EmptyResponse,

    #[error("planning delegate failed: {0}")]
    Delegate(String),

    #[error("no JSON array found in response")]
    NoArray,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response contained an empty task list")]
    NoTasks,

    #[error("task #{index} is invalid: {reason}")]
    InvalidEntry { index: usize, reason: String },
}
