#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use genius_core::api::{
    AppConfig, Editor, Linter, PlanningDelegate, Repository, SecurityFinding, SecurityScanner,
    Services, TestRunner,
};

/// Records every instruction; fails when the message contains `fail_marker`.
#[derive(Default)]
pub struct FakeEditor {
    pub messages: Mutex<Vec<String>>,
    pub fail_marker: Option<String>,
}

impl FakeEditor {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Editor for FakeEditor {
    fn name(&self) -> &str {
        "fake-editor"
    }

    async fn apply(&self, message: &str) -> anyhow::Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        match &self.fail_marker {
            Some(m) if message.contains(m.as_str()) => anyhow::bail!("editor crashed"),
            _ => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct FakeRepo {
    pub files: Vec<String>,
    pub dirty: AtomicBool,
    pub commits: Mutex<Vec<String>>,
}

impl FakeRepo {
    pub fn with_files(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(|f| f.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn commits(&self) -> Vec<String> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Repository for FakeRepo {
    fn name(&self) -> &str {
        "fake-repo"
    }

    async fn tracked_files(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.files.clone())
    }

    async fn is_dirty(&self) -> anyhow::Result<bool> {
        Ok(self.dirty.load(Ordering::SeqCst))
    }

    async fn commit(&self, message: &str) -> anyhow::Result<()> {
        self.commits.lock().unwrap().push(message.to_string());
        self.dirty.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Plays back scripted outcomes; passes once the script runs out.
#[derive(Default)]
pub struct ScriptedTests {
    pub script: Mutex<VecDeque<Option<String>>>,
    pub calls: AtomicUsize,
    pub always_fail: Option<String>,
}

impl ScriptedTests {
    pub fn always_failing(output: &str) -> Self {
        Self {
            always_fail: Some(output.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TestRunner for ScriptedTests {
    fn name(&self) -> &str {
        "scripted-tests"
    }

    async fn run_tests(&self, _command: &str) -> anyhow::Result<Option<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(out) = &self.always_fail {
            return Ok(Some(out.clone()));
        }
        Ok(self.script.lock().unwrap().pop_front().flatten())
    }
}

pub struct CleanLinter;

#[async_trait]
impl Linter for CleanLinter {
    fn name(&self) -> &str {
        "clean-linter"
    }

    async fn lint(&self, _file: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

pub struct ErroringScanner;

#[async_trait]
impl SecurityScanner for ErroringScanner {
    fn name(&self) -> &str {
        "erroring-scanner"
    }

    async fn scan(&self, _files: &[String]) -> anyhow::Result<Vec<SecurityFinding>> {
        anyhow::bail!("scanner crashed")
    }
}

/// Planning delegate answering every request with the same text.
pub struct CannedPlanner(pub String);

#[async_trait]
impl PlanningDelegate for CannedPlanner {
    fn name(&self) -> &str {
        "canned-planner"
    }

    async fn complete(&self, _system: &str, _user: &str) -> anyhow::Result<Option<String>> {
        Ok(Some(self.0.clone()))
    }
}

/// No lint, no tests, no commit, no progress bar, no planning delegate.
pub fn quiet_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.validation.auto_lint = false;
    cfg.validation.auto_test = false;
    cfg.validation.security_scan = false;
    cfg.repo.auto_commit = false;
    cfg.repo.repo_map = false;
    cfg.orchestrator.progress_bar = false;
    cfg
}

pub fn services(editor: Arc<FakeEditor>, repo: Arc<FakeRepo>) -> Services {
    Services::new(editor, repo)
}
