//! Git-backed working-tree view.
use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use genius_core::api::Repository;

use crate::process::{run_command, CommandOutput};

const MAP_FILE_LIMIT: usize = 300;

pub struct GitRepository {
    root: PathBuf,
    source_extensions: Vec<String>,
}

impl GitRepository {
    pub fn new(root: impl Into<PathBuf>, source_extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            source_extensions,
        }
    }

    async fn git(&self, args: &[&str]) -> anyhow::Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let out = run_command("git", &args, &self.root, None).await?;
        if !out.success() {
            anyhow::bail!("git {} failed: {}", args.join(" "), out.combined());
        }
        Ok(out)
    }

    /// Source files found by walking the root, for trees that are not git checkouts.
    fn glob_source_files(&self) -> Vec<String> {
        let mut files = Vec::new();
        for ext in &self.source_extensions {
            let pattern = self.root.join("**").join(format!("*.{}", ext));
            let Some(pattern) = pattern.to_str() else {
                continue;
            };
            let Ok(paths) = glob::glob(pattern) else {
                continue;
            };
            for path in paths.flatten() {
                if let Ok(rel) = path.strip_prefix(&self.root) {
                    if rel.components().any(|c| c.as_os_str() == ".git") {
                        continue;
                    }
                    files.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
        files.sort();
        files.dedup();
        files
    }
}

/// Indented directory tree of `files`, truncated after `MAP_FILE_LIMIT` entries.
pub fn render_tree(files: &[String]) -> String {
    #[derive(Default)]
    struct Node {
        children: BTreeMap<String, Node>,
    }

    let mut root = Node::default();
    for file in files.iter().take(MAP_FILE_LIMIT) {
        let mut node = &mut root;
        for part in file.split('/').filter(|p| !p.is_empty()) {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    fn walk(node: &Node, depth: usize, out: &mut Vec<String>) {
        for (name, child) in &node.children {
            let suffix = if child.children.is_empty() { "" } else { "/" };
            out.push(format!("{}{}{}", "  ".repeat(depth), name, suffix));
            walk(child, depth + 1, out);
        }
    }

    let mut lines = Vec::new();
    walk(&root, 0, &mut lines);
    if files.len() > MAP_FILE_LIMIT {
        lines.push(format!("... {} more files", files.len() - MAP_FILE_LIMIT));
    }
    lines.join("\n")
}

#[async_trait]
impl Repository for GitRepository {
    fn name(&self) -> &str {
        "git"
    }

    async fn tracked_files(&self) -> anyhow::Result<Vec<String>> {
        match self.git(&["ls-files"]).await {
            Ok(out) => Ok(out
                .stdout
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) => {
                tracing::debug!(
                    target: "genius.repo",
                    error = %e,
                    "git ls-files unavailable, walking the tree"
                );
                Ok(self.glob_source_files())
            }
        }
    }

    async fn is_dirty(&self) -> anyhow::Result<bool> {
        let out = self.git(&["status", "--porcelain"]).await?;
        Ok(!out.stdout.trim().is_empty())
    }

    async fn commit(&self, message: &str) -> anyhow::Result<()> {
        self.git(&["add", "-A"]).await?;
        self.git(&["commit", "-m", message]).await?;
        tracing::info!(target: "genius.repo", message = %message, "committed");
        Ok(())
    }

    async fn repo_map(&self) -> anyhow::Result<Option<String>> {
        let files = self.tracked_files().await?;
        if files.is_empty() {
            return Ok(None);
        }
        Ok(Some(render_tree(&files)))
    }
}
