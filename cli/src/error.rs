use genius_core::api::{ErrorCode, GeniusError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Run(#[from] GeniusError),
    #[error("command failed: {0}")]
    Command(String),
    #[error("config error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    // 0: success
    // 1: run finished without meeting its goal (returned as a normal exit code)
    // 11: config error
    // 20: io / command error
    // 30: planning failure
    // 50: internal/uncategorized
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Run(e) => match e.error_code() {
                ErrorCode::ConfigError => 11,
                ErrorCode::IoError => 20,
                ErrorCode::PlanningFailure => 30,
                _ => 50,
            },
            Self::Config(_) => 11,
            Self::Io(_) | Self::Command(_) => 20,
            Self::Anyhow(_) => 50,
        }
    }
}
