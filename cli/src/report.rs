//! Human-readable rendering of plans and run reports.
use genius_core::api::{ExecutionReport, Task, ValidationResult};

fn list(label: &str, names: &[String]) -> String {
    if names.is_empty() {
        format!("{} (0)", label)
    } else {
        format!("{} ({}): {}", label, names.len(), names.join(", "))
    }
}

fn check(passed: bool) -> &'static str {
    if passed {
        "ok"
    } else {
        "FAILED"
    }
}

fn render_validation(v: &ValidationResult) -> String {
    format!(
        "Final validation: lint {}, tests {}, security {}",
        check(v.lint_passed),
        check(v.tests_passed),
        check(v.security_passed)
    )
}

pub fn render_report(report: &ExecutionReport, forced: &[String]) -> String {
    let mut lines = vec![format!(
        "Run {} {} after {} iteration(s) in {}ms",
        report.run_id,
        if report.success { "succeeded" } else { "did not succeed" },
        report.iterations,
        report.duration_ms()
    )];
    if let Some(goal) = &report.goal {
        lines.push(format!("Goal: {}", goal));
    }
    lines.push(list("Completed", &report.completed));
    lines.push(list("Failed", &report.failed));
    lines.push(list("Pending", &report.pending));
    if !forced.is_empty() {
        lines.push(format!("Forced past dependencies: {}", forced.join(", ")));
    }
    match &report.final_validation {
        Some(v) => {
            lines.push(render_validation(v));
            if let Some(ctx) = v.error_context() {
                lines.push(String::new());
                lines.push(ctx);
            }
        }
        None => lines.push("Final validation: not run".to_string()),
    }
    lines.join("\n")
}

pub fn render_plan(goal: &str, tasks: &[Task], forced: &[String]) -> String {
    let mut lines = vec![format!("Plan for: {}", goal)];
    for (i, task) in tasks.iter().enumerate() {
        let mut head = format!("{}. [p{}] {} ({})", i + 1, task.priority, task.name, task.kind);
        if !task.dependencies.is_empty() {
            head.push_str(&format!(" after: {}", task.dependencies.join(", ")));
        }
        if forced.contains(&task.name) {
            head.push_str(" [forced]");
        }
        lines.push(head);
        if let Some(file) = &task.file {
            lines.push(format!("   file: {}", file));
        }
        for detail in task.details.lines().filter(|l| !l.trim().is_empty()) {
            lines.push(format!("   {}", detail.trim_end()));
        }
    }
    lines.join("\n")
}
