use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use genius_core::api::{Editor, EditorConfig};

use crate::process::run_command;

/// Runs an external code-editing CLI with the instruction as its last argument.
pub struct CodeCliEditor {
    cmd: String,
    args: Vec<String>,
    root: PathBuf,
    timeout: Duration,
}

impl CodeCliEditor {
    pub fn new(cfg: &EditorConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cfg.cmd.clone(),
            args: cfg.args.clone(),
            root: root.into(),
            timeout: Duration::from_millis(cfg.timeout_ms),
        }
    }
}

#[async_trait]
impl Editor for CodeCliEditor {
    fn name(&self) -> &str {
        &self.cmd
    }

    async fn apply(&self, message: &str) -> anyhow::Result<()> {
        let mut args = self.args.clone();
        args.push(message.to_string());

        let out = run_command(&self.cmd, &args, &self.root, Some(self.timeout)).await?;
        if !out.success() {
            let detail = out.combined();
            anyhow::bail!(
                "'{}' exited with {}{}",
                self.cmd,
                out.exit_code
                    .map(|c| format!("status {}", c))
                    .unwrap_or_else(|| "a signal".to_string()),
                if detail.is_empty() {
                    String::new()
                } else {
                    format!(": {}", detail)
                }
            );
        }
        Ok(())
    }
}
