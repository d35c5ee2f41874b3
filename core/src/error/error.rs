use thiserror::Error;

/// Stable numeric codes for each failure class, surfaced as process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    GeneralError = 1,
    ConfigError = 11,
    IoError = 20,
    PlanningFailure = 30,
    EditFailure = 31,
    ValidationFailure = 32,
    DependencyDeadlock = 33,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Failure taxonomy of the orchestration loop.
///
/// Only `PlanningFailure` is fatal to a run. `EditFailure` and
/// `ValidationFailure` are recorded against a single task, and
/// `DependencyDeadlock` is resolved by forced selection and only logged.
#[derive(Error, Debug)]
pub enum GeniusError {
    #[error("planning failed: {0}")]
    PlanningFailure(String),

    #[error("edit failed: {0}")]
    EditFailure(String),

    #[error("validation failed: {0}")]
    ValidationFailure(String),

    #[error("dependency deadlock: {0}")]
    DependencyDeadlock(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GeniusError {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::PlanningFailure(_) => ErrorCode::PlanningFailure,
            Self::EditFailure(_) => ErrorCode::EditFailure,
            Self::ValidationFailure(_) => ErrorCode::ValidationFailure,
            Self::DependencyDeadlock(_) => ErrorCode::DependencyDeadlock,
            Self::Config(_) => ErrorCode::ConfigError,
            Self::Io(_) => ErrorCode::IoError,
        }
    }
}
