//! Tracing setup. Logs go to stderr and/or `~/.genius/logs`; stdout is reserved
//! for the plan or report.
use std::path::PathBuf;
use std::sync::OnceLock;

use genius_core::api::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::error::CliError;

const LOG_FILE_PREFIX: &str = "genius.log";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// `logging.directory` (with `~` expanded), else `~/.genius/logs`, else the temp dir.
pub fn log_dir(logging: &LoggingConfig) -> PathBuf {
    if let Some(d) = logging
        .directory
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        return PathBuf::from(shellexpand::tilde(d).as_ref());
    }
    genius_core::config::get_genius_data_dir()
        .map(|dir| dir.join("logs"))
        .unwrap_or_else(|_| std::env::temp_dir().join("genius"))
}

/// `RUST_LOG` wins over the configured level.
fn filter(logging: &LoggingConfig) -> Result<EnvFilter, CliError> {
    match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => Ok(EnvFilter::from_default_env()),
        _ => EnvFilter::try_new(&logging.level)
            .map_err(|e| CliError::Config(format!("invalid logging.level '{}': {}", logging.level, e))),
    }
}

pub fn init(logging: &LoggingConfig) -> Result<(), CliError> {
    if !logging.enabled {
        return Ok(());
    }
    if !logging.console && !logging.file {
        return Err(CliError::Config(
            "logging is enabled but both console and file output are off".into(),
        ));
    }

    let filter = filter(logging)?;

    let file_layer = if logging.file {
        let dir = log_dir(logging);
        std::fs::create_dir_all(&dir).map_err(|e| {
            CliError::Command(format!("cannot create log directory {}: {}", dir.display(), e))
        })?;
        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX));
        let _ = LOG_GUARD.set(guard);
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true),
        )
    } else {
        None
    };

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}
