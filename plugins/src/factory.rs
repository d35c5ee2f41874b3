use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use genius_core::api::{
    AppConfig, Editor, Linter, PatternScanner, PlanningDelegate, Repository, SearchProvider,
    SecurityScanner, TestRunner,
};

use crate::checks::{CommandLinter, CommandTestRunner};
use crate::editor::CodeCliEditor;
use crate::planner::ChatCompletionsDelegate;
use crate::repo::GitRepository;
use crate::search::SerperSearch;

fn root(cfg: &AppConfig) -> PathBuf {
    PathBuf::from(&cfg.repo.root)
}

pub fn build_editor(cfg: &AppConfig) -> Arc<dyn Editor> {
    Arc::new(CodeCliEditor::new(&cfg.editor, root(cfg)))
}

pub fn build_repository(cfg: &AppConfig) -> Arc<dyn Repository> {
    Arc::new(GitRepository::new(
        root(cfg),
        cfg.validation.source_extensions.clone(),
    ))
}

pub fn build_linter(cfg: &AppConfig) -> Option<Arc<dyn Linter>> {
    let cmd = cfg.validation.lint_cmd.as_deref()?.trim();
    if !cfg.validation.auto_lint || cmd.is_empty() {
        return None;
    }
    Some(Arc::new(CommandLinter::new(cmd, root(cfg))))
}

pub fn build_test_runner(cfg: &AppConfig) -> Option<Arc<dyn TestRunner>> {
    if !cfg.validation.tests_enabled() {
        return None;
    }
    Some(Arc::new(CommandTestRunner::new(root(cfg))))
}

pub fn build_security(cfg: &AppConfig) -> Result<Option<Arc<dyn SecurityScanner>>> {
    if !cfg.validation.security_scan {
        return Ok(None);
    }
    Ok(Some(Arc::new(PatternScanner::new(root(cfg))?)))
}

pub fn build_planner(cfg: &AppConfig) -> Result<Option<Arc<dyn PlanningDelegate>>> {
    if !cfg.planner.is_usable() {
        return Ok(None);
    }
    Ok(Some(Arc::new(ChatCompletionsDelegate::new(
        &cfg.planner.base_url,
        cfg.planner.api_key.clone(),
        cfg.planner.model.clone(),
        cfg.planner.timeout_ms,
    )?)))
}

pub fn build_search(cfg: &AppConfig) -> Result<Option<Arc<dyn SearchProvider>>> {
    if !cfg.search.enabled {
        return Ok(None);
    }
    let search = SerperSearch::new(
        &cfg.search.base_url,
        cfg.search.api_key.clone(),
        cfg.search.enabled,
        cfg.search.timeout_ms,
    )?;
    if !search.is_available() {
        tracing::warn!(
            target: "genius.search",
            "web search enabled but SERPER_API_KEY is not set; continuing without it"
        );
        return Ok(None);
    }
    Ok(Some(Arc::new(search)))
}
