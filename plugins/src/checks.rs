//! Lint and test collaborators that shell out to configured commands.
use std::path::PathBuf;

use async_trait::async_trait;

use genius_core::api::{Linter, TestRunner};

use crate::process::{run_command, shell};

/// Runs `lint_cmd <file>`; exit 0 means clean.
pub struct CommandLinter {
    cmd: String,
    root: PathBuf,
}

impl CommandLinter {
    pub fn new(cmd: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            root: root.into(),
        }
    }
}

fn quote(arg: &str) -> String {
    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

#[async_trait]
impl Linter for CommandLinter {
    fn name(&self) -> &str {
        &self.cmd
    }

    async fn lint(&self, file: &str) -> anyhow::Result<Option<String>> {
        let (prog, args) = shell(&format!("{} {}", self.cmd, quote(file)));
        let out = run_command(&prog, &args, &self.root, None).await?;
        if out.success() {
            return Ok(None);
        }
        let text = out.combined();
        Ok(Some(if text.is_empty() {
            format!("'{}' reported problems in {}", self.cmd, file)
        } else {
            text
        }))
    }
}

/// Runs the test command through the shell in the repository root.
pub struct CommandTestRunner {
    root: PathBuf,
}

impl CommandTestRunner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl TestRunner for CommandTestRunner {
    fn name(&self) -> &str {
        "shell"
    }

    async fn run_tests(&self, command: &str) -> anyhow::Result<Option<String>> {
        let (prog, args) = shell(command);
        let out = run_command(&prog, &args, &self.root, None).await?;
        if out.success() {
            return Ok(None);
        }
        let text = out.combined();
        Ok(Some(if text.is_empty() {
            format!("'{}' failed with exit code {:?}", command, out.exit_code)
        } else {
            text
        }))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_runner_pass_and_fail() {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandTestRunner::new(dir.path());
        assert_eq!(runner.run_tests("true").await.unwrap(), None);
        assert_eq!(
            runner.run_tests("echo 'test_x FAILED'; exit 1").await.unwrap(),
            Some("test_x FAILED".to_string())
        );
        assert_eq!(
            runner.run_tests("exit 4").await.unwrap(),
            Some("'exit 4' failed with exit code Some(4)".to_string())
        );
    }

    #[tokio::test]
    async fn test_linter_appends_quoted_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("it's.py"), "x = 1\n").unwrap();
        let linter = CommandLinter::new("test -f", dir.path());
        assert_eq!(linter.lint("it's.py").await.unwrap(), None);

        let missing = linter.lint("gone.py").await.unwrap();
        assert_eq!(
            missing.as_deref(),
            Some("'test -f' reported problems in gone.py")
        );
    }
}
