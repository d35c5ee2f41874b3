use crate::task::{Issue, IssueCategory, Severity, Task, TaskKind};

use super::is_generic_goal;

/// Deterministic plan: one goal task plus a fix task per high-severity test failure.
///
/// Lint and security issues never produce tasks here; the delegated planner may
/// still schedule them when they block the goal.
pub fn fallback_plan(goal: &str, issues: &[Issue]) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(1 + issues.len());

    if is_generic_goal(goal) {
        tasks.push(Task::new(
            "Analyze and improve codebase",
            TaskKind::Improvement,
            1,
            goal,
        ));
    } else {
        tasks.push(Task::new(
            "Implement requested feature",
            TaskKind::FeatureImplementation,
            1,
            goal,
        ));
    }

    for issue in issues
        .iter()
        .filter(|i| i.category == IssueCategory::Test && i.severity == Severity::High)
    {
        let task = match &issue.file {
            Some(file) => Task::new(
                format!("Fix failing tests in {}", file),
                TaskKind::FixTests,
                2,
                issue.details.clone(),
            )
            .with_file(file.clone()),
            None => Task::new(
                "Fix failing tests",
                TaskKind::FixTests,
                2,
                issue.details.clone(),
            ),
        };
        tasks.push(task);
    }

    tasks
}
