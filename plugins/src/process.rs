//! Child-process helpers shared by the editor, check runners and git.
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout then stderr, trimmed, skipping empty streams.
    pub fn combined(&self) -> String {
        [self.stdout.trim(), self.stderr.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run `program args...` in `cwd`, killing it if it outlives `timeout`.
pub async fn run_command(
    program: &str,
    args: &[String],
    cwd: &Path,
    timeout: Option<Duration>,
) -> anyhow::Result<CommandOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    tracing::debug!(
        target: "genius.process",
        program = %program,
        args = args.len(),
        cwd = %cwd.display(),
        "spawning"
    );

    let child = cmd
        .spawn()
        .with_context(|| format!("failed to spawn '{}'", program))?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| anyhow::anyhow!("'{}' timed out after {}ms", program, limit.as_millis()))?,
        None => child.wait_with_output().await,
    }
    .with_context(|| format!("failed to wait for '{}'", program))?;

    Ok(CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Program and arguments that run `command_line` through the platform shell.
pub fn shell(command_line: &str) -> (String, Vec<String>) {
    if cfg!(windows) {
        ("cmd".to_string(), vec!["/C".to_string(), command_line.to_string()])
    } else {
        ("sh".to_string(), vec!["-c".to_string(), command_line.to_string()])
    }
}
