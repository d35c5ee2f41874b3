mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{
    quiet_config, services, CannedPlanner, CleanLinter, ErroringScanner, FakeEditor, FakeRepo,
    ScriptedTests,
};
use genius_core::api::{
    GeniusError, LoopPhase, Orchestrator, PatternScanner, TaskKind, ValidationResult,
};

#[tokio::test]
async fn goal_with_no_checks_completes_in_one_pass() {
    let editor = Arc::new(FakeEditor::default());
    let repo = Arc::new(FakeRepo::default());
    let mut orch = Orchestrator::new(quiet_config(), services(editor.clone(), repo));

    let report = orch.run(Some("add error handling")).await.unwrap();

    assert_eq!(orch.graph().len(), 1);
    let (_, task) = orch.graph().iter().next().unwrap();
    assert_eq!(task.kind, TaskKind::FeatureImplementation);
    assert_eq!(task.priority, 1);

    assert_eq!(report.iterations, 1);
    assert_eq!(report.completed, vec!["Implement requested feature".to_string()]);
    assert!(report.failed.is_empty());
    assert!(report.pending.is_empty());
    assert_eq!(report.final_validation, Some(ValidationResult::all_clear()));
    assert!(report.success);
    assert_eq!(orch.phase(), LoopPhase::Done);
    assert_eq!(editor.messages().len(), 1);
    assert!(editor.messages()[0].contains("add error handling"));
}

#[tokio::test]
async fn fix_task_failing_three_times_lands_in_failed() {
    let mut cfg = quiet_config();
    cfg.validation.auto_test = true;
    cfg.validation.test_cmd = Some("pytest".into());

    let editor = Arc::new(FakeEditor::default());
    let tests = Arc::new(ScriptedTests::always_failing("test_parse FAILED"));
    let mut svc = services(editor.clone(), Arc::new(FakeRepo::default()));
    svc.test_runner = Some(tests.clone());
    svc.planner = Some(Arc::new(CannedPlanner(
        r#"[{"name": "Fix tests", "type": "fix_tests", "details": "parser tests", "blocks_goal": true}]"#
            .into(),
    )));

    let mut orch = Orchestrator::new(cfg, svc);
    let report = orch.run(Some("make the parser tests pass")).await.unwrap();

    assert_eq!(tests.calls(), 3);
    assert_eq!(report.iterations, 3);
    assert_eq!(report.failed, vec!["Fix tests".to_string()]);
    assert!(report.completed.is_empty());
    assert!(report.pending.is_empty());
    assert!(!report.success);

    let id = orch.graph().find("Fix tests").unwrap();
    assert_eq!(orch.graph().get(id).retry_count, 2);

    let messages = editor.messages();
    assert_eq!(messages.len(), 3);
    assert!(!messages[0].contains("previous attempt"));
    assert!(messages[1].contains("failed validation; this is attempt 2"));
    assert!(messages[2].contains("failed validation; this is attempt 3"));
    assert!(messages[2].contains("Test failures:\ntest_parse FAILED"));
}

#[tokio::test]
async fn dependent_of_failed_edit_is_never_scheduled() {
    let editor = Arc::new(FakeEditor::failing_on("BREAK-EDITOR"));
    let mut svc = services(editor.clone(), Arc::new(FakeRepo::default()));
    svc.planner = Some(Arc::new(CannedPlanner(
        r#"[
            {"name": "A", "type": "refactor", "details": "BREAK-EDITOR"},
            {"name": "B", "type": "refactor", "details": "after A", "dependencies": ["A"]}
        ]"#
        .into(),
    )));

    let mut orch = Orchestrator::new(quiet_config(), svc);
    let report = orch.run(Some("restructure")).await.unwrap();

    assert_eq!(editor.messages().len(), 1);
    assert_eq!(report.failed, vec!["A".to_string()]);
    assert!(report.completed.is_empty());
    assert_eq!(report.pending, vec!["B".to_string()]);
    assert_eq!(report.iterations, 5);
    assert_eq!(report.final_validation, None);
    assert!(!report.success);
}

#[tokio::test]
async fn security_finding_alone_fails_validation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("loader.py"),
        "import pickle\n\ndef load(blob):\n    return pickle.loads(blob)\n",
    )
    .unwrap();

    let mut cfg = quiet_config();
    cfg.orchestrator.max_iterations = 2;
    cfg.validation.auto_lint = true;
    cfg.validation.auto_test = true;
    cfg.validation.test_cmd = Some("pytest".into());
    cfg.validation.security_scan = true;

    let editor = Arc::new(FakeEditor::default());
    let mut svc = services(editor.clone(), Arc::new(FakeRepo::with_files(&["loader.py"])));
    svc.linter = Some(Arc::new(CleanLinter));
    svc.test_runner = Some(Arc::new(ScriptedTests::default()));
    svc.security = Some(Arc::new(PatternScanner::new(dir.path()).unwrap()));

    let mut orch = Orchestrator::new(cfg, svc);
    let report = orch.run(Some("add a cache")).await.unwrap();

    let last = report.final_validation.clone().unwrap();
    assert!(last.lint_passed);
    assert!(last.tests_passed);
    assert!(!last.security_passed);
    assert!(!last.passed());
    assert!(!report.success);
    assert_eq!(report.pending, vec!["Implement requested feature".to_string()]);

    let carried = &orch.memory().previous_errors[0];
    assert!(carried.starts_with("Security issues:\nloader.py:4: unsafe deserialization"));
    assert!(!carried.contains("Lint errors"));
    assert!(!carried.contains("Test failures"));
    assert!(editor.messages()[1].contains("Security issues:"));
}

#[tokio::test]
async fn erroring_check_is_isolated_from_siblings() {
    let mut cfg = quiet_config();
    cfg.validation.auto_test = true;
    cfg.validation.test_cmd = Some("pytest".into());
    cfg.validation.security_scan = true;
    cfg.orchestrator.max_iterations = 1;

    let tests = Arc::new(ScriptedTests::default());
    let mut svc = services(
        Arc::new(FakeEditor::default()),
        Arc::new(FakeRepo::with_files(&["app.py"])),
    );
    svc.test_runner = Some(tests.clone());
    svc.security = Some(Arc::new(ErroringScanner));

    let mut orch = Orchestrator::new(cfg, svc);
    let report = orch.run(Some("add logging")).await.unwrap();

    let last = report.final_validation.unwrap();
    assert_eq!(tests.calls(), 1);
    assert!(last.tests_passed);
    assert!(!last.security_passed);
    assert!(last
        .security_output
        .unwrap()
        .contains("security check raised an error: scanner crashed"));
}

#[tokio::test]
async fn retry_succeeds_and_commits_dirty_tree() {
    let mut cfg = quiet_config();
    cfg.validation.auto_test = true;
    cfg.validation.test_cmd = Some("pytest".into());
    cfg.repo.auto_commit = true;

    let repo = Arc::new(FakeRepo::default());
    repo.dirty.store(true, Ordering::SeqCst);
    let tests = Arc::new(ScriptedTests::default());
    tests
        .script
        .lock()
        .unwrap()
        .push_back(Some("test_cache FAILED".into()));

    let mut svc = services(Arc::new(FakeEditor::default()), repo.clone());
    svc.test_runner = Some(tests.clone());

    let mut orch = Orchestrator::new(cfg, svc);
    let report = orch.run(Some("add a cache")).await.unwrap();

    assert_eq!(report.iterations, 2);
    assert_eq!(report.completed, vec!["Implement requested feature".to_string()]);
    assert!(report.success);
    assert_eq!(
        repo.commits(),
        vec!["genius: complete task 'Implement requested feature'".to_string()]
    );
}

#[tokio::test]
async fn error_context_is_not_inherited_by_other_tasks() {
    let mut cfg = quiet_config();
    cfg.validation.auto_test = true;
    cfg.validation.test_cmd = Some("pytest".into());
    cfg.orchestrator.max_retries = 0;

    let editor = Arc::new(FakeEditor::default());
    let tests = Arc::new(ScriptedTests::default());
    tests
        .script
        .lock()
        .unwrap()
        .push_back(Some("first task broke things".into()));
    let mut svc = services(editor.clone(), Arc::new(FakeRepo::default()));
    svc.test_runner = Some(tests);
    svc.planner = Some(Arc::new(CannedPlanner(
        r#"[{"name": "one", "type": "refactor", "details": "first"},
            {"name": "two", "type": "refactor", "details": "second"}]"#
            .into(),
    )));

    let mut orch = Orchestrator::new(cfg, svc);
    let report = orch.run(Some("tidy up")).await.unwrap();

    assert_eq!(report.failed, vec!["one".to_string()]);
    assert_eq!(report.completed, vec!["two".to_string()]);
    assert!(!editor.messages()[1].contains("first task broke things"));
}

#[tokio::test]
async fn dependency_cycle_still_runs_every_task() {
    let mut svc = services(Arc::new(FakeEditor::default()), Arc::new(FakeRepo::default()));
    svc.planner = Some(Arc::new(CannedPlanner(
        r#"[{"name": "x", "type": "refactor", "priority": 2, "details": "x", "dependencies": ["y"]},
            {"name": "y", "type": "refactor", "priority": 3, "details": "y", "dependencies": ["x"]}]"#
            .into(),
    )));

    let mut orch = Orchestrator::new(quiet_config(), svc);
    let report = orch.run(Some("untangle")).await.unwrap();

    assert_eq!(orch.forced_tasks(), vec!["x".to_string()]);
    assert_eq!(report.completed, vec!["x".to_string(), "y".to_string()]);
    assert!(report.success);
}

#[tokio::test]
async fn forced_task_still_waits_on_dependency_outside_the_cycle() {
    let editor = Arc::new(FakeEditor::failing_on("BREAK-EDITOR"));
    let mut svc = services(editor.clone(), Arc::new(FakeRepo::default()));
    svc.planner = Some(Arc::new(CannedPlanner(
        r#"[{"name": "A", "type": "refactor", "priority": 1, "details": "BREAK-EDITOR"},
            {"name": "B", "type": "refactor", "priority": 2, "details": "b", "dependencies": ["A", "C"]},
            {"name": "C", "type": "refactor", "priority": 3, "details": "c", "dependencies": ["B"]}]"#
            .into(),
    )));

    let mut orch = Orchestrator::new(quiet_config(), svc);
    let report = orch.run(Some("untangle")).await.unwrap();

    assert_eq!(orch.forced_tasks(), vec!["B".to_string()]);
    assert_eq!(editor.messages().len(), 1);
    assert_eq!(report.failed, vec!["A".to_string()]);
    assert!(report.completed.is_empty());
    assert_eq!(report.pending, vec!["B".to_string(), "C".to_string()]);
    assert_eq!(report.iterations, 5);
    assert!(!report.success);
}

#[tokio::test]
async fn missing_goal_fails_planning() {
    let mut orch = Orchestrator::new(
        quiet_config(),
        services(Arc::new(FakeEditor::default()), Arc::new(FakeRepo::default())),
    );

    let err = orch.run(Some("   ")).await.unwrap_err();
    assert!(matches!(err, GeniusError::PlanningFailure(_)));
    assert_eq!(orch.phase(), LoopPhase::Done);
    assert!(orch.report().is_none());
}

#[tokio::test]
async fn baseline_test_failure_becomes_fix_task() {
    let mut cfg = quiet_config();
    cfg.orchestrator.analyze_before_planning = true;
    cfg.validation.auto_test = true;
    cfg.validation.test_cmd = Some("pytest".into());

    let tests = Arc::new(ScriptedTests::default());
    tests
        .script
        .lock()
        .unwrap()
        .push_back(Some("test_io FAILED".into()));
    let mut svc = services(Arc::new(FakeEditor::default()), Arc::new(FakeRepo::default()));
    svc.test_runner = Some(tests);

    let mut orch = Orchestrator::new(cfg, svc);
    let tasks = orch.plan(Some("add caching")).await.unwrap();

    let kinds: Vec<(TaskKind, u32)> = tasks.iter().map(|t| (t.kind, t.priority)).collect();
    assert_eq!(
        kinds,
        vec![
            (TaskKind::FeatureImplementation, 1),
            (TaskKind::FixTests, 2)
        ]
    );
    assert_eq!(orch.memory().last_test_output.as_deref(), Some("test_io FAILED"));
}
