//! CLI assembly: merge flag overrides into config, build services, and drive the orchestrator.
use std::path::Path;

use genius_core::api::{self as core_api, AppConfig, Orchestrator, ServicesFactory};
use genius_plugins::services::PluginServicesFactory;

use crate::commands::cli::{PlanArgs, RunArgs};
use crate::error::CliError;
use crate::report;

pub fn load_config(path: Option<&str>) -> Result<AppConfig, CliError> {
    let cfg = match path {
        Some(p) => {
            let expanded = shellexpand::tilde(p);
            let mut cfg = core_api::load_file(Path::new(expanded.as_ref()))
                .map_err(|e| CliError::Config(format!("{:#}", e)))?;
            genius_core::config::apply_env_overrides(&mut cfg, |key| std::env::var(key).ok());
            cfg
        }
        None => core_api::load_default().map_err(|e| CliError::Config(format!("{:#}", e)))?,
    };
    Ok(cfg)
}

pub fn apply_repo(cfg: &mut AppConfig, repo: Option<&str>) {
    if let Some(r) = repo.map(str::trim).filter(|r| !r.is_empty()) {
        cfg.repo.root = shellexpand::tilde(r).into_owned();
    }
}

pub fn apply_run_overrides(cfg: &mut AppConfig, args: &RunArgs) {
    if let Some(n) = args.max_iterations {
        cfg.orchestrator.max_iterations = n;
    }
    if let Some(n) = args.max_retries {
        cfg.orchestrator.max_retries = n;
    }
    if let Some(cmd) = &args.test_cmd {
        cfg.validation.test_cmd = Some(cmd.clone());
    }
    if let Some(cmd) = &args.lint_cmd {
        cfg.validation.lint_cmd = Some(cmd.clone());
    }
    if args.no_lint {
        cfg.validation.auto_lint = false;
    }
    if args.no_security_scan {
        cfg.validation.security_scan = false;
    }
    if args.no_commit {
        cfg.repo.auto_commit = false;
    }
    if args.no_planner {
        cfg.planner.enabled = false;
    }
    if args.web_search {
        cfg.search.enabled = true;
    }
    if args.analyze {
        cfg.orchestrator.analyze_before_planning = true;
    }
    if args.progress {
        cfg.orchestrator.progress_bar = true;
    }
    cfg.orchestrator
        .previous_errors
        .extend(args.previous_errors.iter().cloned());
}

pub fn apply_plan_overrides(cfg: &mut AppConfig, args: &PlanArgs) {
    if args.no_planner {
        cfg.planner.enabled = false;
    }
    if args.analyze {
        cfg.orchestrator.analyze_before_planning = true;
    }
    if let Some(cmd) = &args.test_cmd {
        cfg.validation.test_cmd = Some(cmd.clone());
    }
}

/// Flag goal, then the configured default, then the generic improvement goal.
pub fn resolve_goal(flag: Option<&str>, cfg: &AppConfig) -> String {
    flag.map(str::trim)
        .filter(|g| !g.is_empty())
        .or_else(|| {
            cfg.orchestrator
                .default_goal
                .as_deref()
                .map(str::trim)
                .filter(|g| !g.is_empty())
        })
        .unwrap_or(core_api::DEFAULT_GOAL)
        .to_string()
}

async fn orchestrator(cfg: AppConfig) -> Result<Orchestrator, CliError> {
    let services = PluginServicesFactory.build_services(&cfg).await?;
    Ok(Orchestrator::new(cfg, services))
}

#[tracing::instrument(name = "cli.run", skip(cfg, args))]
pub async fn run(mut cfg: AppConfig, args: RunArgs, json: bool) -> Result<i32, CliError> {
    apply_run_overrides(&mut cfg, &args);
    let goal = resolve_goal(args.goal.as_deref(), &cfg);
    tracing::info!(target: "genius.cli", goal = %goal, root = %cfg.repo.root, "starting run");

    let mut orch = orchestrator(cfg).await?;
    let report = orch.run(Some(&goal)).await?;

    let rendered = if json {
        serde_json::to_string_pretty(&report).map_err(anyhow::Error::from)?
    } else {
        report::render_report(&report, &orch.forced_tasks())
    };
    println!("{}", rendered);

    Ok(if report.success { 0 } else { 1 })
}

#[tracing::instrument(name = "cli.plan", skip(cfg, args))]
pub async fn plan(mut cfg: AppConfig, args: PlanArgs, json: bool) -> Result<i32, CliError> {
    apply_plan_overrides(&mut cfg, &args);
    let goal = resolve_goal(args.goal.as_deref(), &cfg);

    let mut orch = orchestrator(cfg).await?;
    let tasks = orch.plan(Some(&goal)).await?;

    let rendered = if json {
        serde_json::to_string_pretty(&tasks).map_err(anyhow::Error::from)?
    } else {
        report::render_plan(&goal, &tasks, &orch.forced_tasks())
    };
    println!("{}", rendered);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_goal_fallbacks() {
        let mut cfg = AppConfig::default();
        assert_eq!(resolve_goal(Some("  add caching "), &cfg), "add caching");
        assert_eq!(resolve_goal(Some("   "), &cfg), core_api::DEFAULT_GOAL);
        cfg.orchestrator.default_goal = Some("harden input parsing".into());
        assert_eq!(resolve_goal(None, &cfg), "harden input parsing");
    }

    #[test]
    fn test_run_overrides() {
        let mut cfg = AppConfig::default();
        cfg.orchestrator.previous_errors = vec!["from config".into()];
        let args = RunArgs {
            max_iterations: Some(9),
            test_cmd: Some("pytest -q".into()),
            no_lint: true,
            no_commit: true,
            web_search: true,
            previous_errors: vec!["from flag".into()],
            ..RunArgs::default()
        };
        apply_run_overrides(&mut cfg, &args);

        assert_eq!(cfg.orchestrator.max_iterations, 9);
        assert_eq!(cfg.orchestrator.max_retries, 2);
        assert_eq!(cfg.validation.test_cmd.as_deref(), Some("pytest -q"));
        assert!(!cfg.validation.auto_lint);
        assert!(cfg.validation.security_scan);
        assert!(!cfg.repo.auto_commit);
        assert!(cfg.search.enabled);
        assert_eq!(
            cfg.orchestrator.previous_errors,
            vec!["from config".to_string(), "from flag".to_string()]
        );
    }

    #[test]
    fn test_repo_override_ignores_blank() {
        let mut cfg = AppConfig::default();
        apply_repo(&mut cfg, Some(" "));
        assert_eq!(cfg.repo.root, ".");
        apply_repo(&mut cfg, Some("/srv/app"));
        assert_eq!(cfg.repo.root, "/srv/app");
    }

    #[test]
    fn test_load_config_reports_bad_file() {
        let err = load_config(Some("/definitely/missing/genius.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 11);
    }
}
