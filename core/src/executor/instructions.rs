use crate::feedback::ContextMemory;
use crate::task::{Task, TaskKind};

const QUERY_DETAILS_LIMIT: usize = 120;

/// Kind-specific instruction message for the editor, without search context.
pub fn build_instruction(task: &Task, prior_error: Option<&str>, memory: &ContextMemory) -> String {
    let mut msg = match task.kind {
        TaskKind::FeatureImplementation => format!(
            "Implement the following feature. Keep the change focused and add tests where appropriate.\n\n{}",
            task.details
        ),
        TaskKind::FixTests => {
            let failures = memory
                .last_test_output
                .as_deref()
                .filter(|o| !o.trim().is_empty())
                .unwrap_or(&task.details);
            format!(
                "Fix the code so the failing tests pass. Do not weaken or delete the tests.\n\nTest output:\n{}",
                failures
            )
        }
        TaskKind::FixLint => {
            let diagnostics = memory
                .last_lint_output
                .as_deref()
                .filter(|o| !o.trim().is_empty())
                .unwrap_or(&task.details);
            format!(
                "Fix these lint errors without changing behaviour.\n\nLint output:\n{}",
                diagnostics
            )
        }
        TaskKind::FixSecurity => format!(
            "Remove the following security risks. Replace dynamic evaluation, shell-interpolated commands and unsafe deserialization with safe equivalents.\n\n{}",
            task.details
        ),
        TaskKind::Improvement => format!(
            "Analyze the codebase and make a focused improvement to quality, robustness or clarity.\n\n{}",
            task.details
        ),
        TaskKind::Refactor => format!(
            "Refactor the following without changing observable behaviour.\n\n{}",
            task.details
        ),
        TaskKind::Documentation => format!(
            "Write or update documentation as described.\n\n{}",
            task.details
        ),
    };

    if let Some(file) = &task.file {
        msg.push_str(&format!("\n\nLimit the change to `{}`.", file));
    }

    if let Some(err) = prior_error.filter(|e| !e.trim().is_empty()) {
        msg.push_str(&format!(
            "\n\nThe previous attempt at this task failed validation; this is attempt {}. Address these problems:\n{}",
            task.retry_count + 1,
            err.trim()
        ));
    }

    msg
}

/// Web-search queries for a task; empty when search would not help.
pub fn search_queries(task: &Task, prior_error: Option<&str>) -> Vec<String> {
    let mut queries = Vec::new();

    if task.kind.is_exploratory() {
        let details = truncate_chars(task.details.trim(), QUERY_DETAILS_LIMIT);
        if !details.is_empty() {
            queries.push(format!("{} best practices", details));
        }
    }

    if let Some(first) = prior_error
        .and_then(|e| e.lines().map(str::trim).find(|l| !l.is_empty() && !l.ends_with(':')))
    {
        queries.push(format!("how to fix {}", truncate_chars(first, QUERY_DETAILS_LIMIT)));
    }

    queries
}

fn truncate_chars(s: &str, limit: usize) -> &str {
    match s.char_indices().nth(limit) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_tests_prefers_recorded_output() {
        let task = Task::new("Fix failing tests", TaskKind::FixTests, 2, "from planner");
        let memory = ContextMemory {
            last_test_output: Some("test_add FAILED".into()),
            ..ContextMemory::default()
        };
        let msg = build_instruction(&task, None, &memory);
        assert!(msg.contains("test_add FAILED"));
        assert!(!msg.contains("from planner"));

        let msg = build_instruction(&task, None, &ContextMemory::default());
        assert!(msg.contains("from planner"));
    }

    #[test]
    fn test_prior_error_and_file_scope_appended() {
        let mut task = Task::new("Tidy", TaskKind::Refactor, 3, "split parse()").with_file("src/io.py");
        task.retry_count = 1;
        let msg = build_instruction(&task, Some("Lint errors:\nE501"), &ContextMemory::default());
        assert!(msg.contains("Limit the change to `src/io.py`."));
        assert!(msg.contains("failed validation; this is attempt 2"));
        assert!(msg.ends_with("Lint errors:\nE501"));
    }

    #[test]
    fn test_search_queries() {
        let feature = Task::new("f", TaskKind::FeatureImplementation, 1, "add rate limiting");
        assert_eq!(
            search_queries(&feature, None),
            vec!["add rate limiting best practices".to_string()]
        );

        let refactor = Task::new("r", TaskKind::Refactor, 3, "split module");
        assert!(search_queries(&refactor, None).is_empty());
        assert_eq!(
            search_queries(&refactor, Some("Test failures:\nKeyError: 'id'\nmore")),
            vec!["how to fix KeyError: 'id'".to_string()]
        );
    }

    #[test]
    fn test_query_details_truncated_on_char_boundary() {
        let task = Task::new("f", TaskKind::Improvement, 1, "é".repeat(200));
        let q = &search_queries(&task, None)[0];
        assert_eq!(q.chars().count(), QUERY_DETAILS_LIMIT + " best practices".len());
    }
}
