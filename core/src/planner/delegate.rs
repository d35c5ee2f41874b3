use serde::Deserialize;

use crate::collab::PlanningDelegate;
use crate::error::PlanParseError;
use crate::task::{Effort, Issue, IssueCategory, RepoContext, Severity, Task, TaskKind};

const MAX_PROMPT_FILES: usize = 200;
const DEFAULT_PRIORITY: u32 = 3;
const UNRELATED_FIX_PRIORITY: u32 = 4;

pub const SYSTEM_PROMPT: &str = r#"You are a senior engineer breaking a goal down into concrete code-change tasks.

Priority rules (lower number = more urgent):
- The user's stated goal and its direct sub-steps MUST have priority 1.
- Fixes for pre-existing issues that block the goal get priority 1 or 2 and "blocks_goal": true.
- Fixes for pre-existing issues unrelated to the goal get priority 4 or higher.

Respond with ONE JSON array and nothing else. Each element:
{
  "name": "short unique task name",
  "type": "feature_implementation | fix_tests | fix_lint | fix_security | improvement | refactor | documentation",
  "priority": 1,
  "details": "what to change and why",
  "dependencies": ["names of tasks that must finish first"],
  "estimated_effort": "low | medium | high",
  "file": "optional/path/scoping/the/task",
  "blocks_goal": false
}"#;

/// Every field is optional so an explicit `null` reads the same as an absent key.
#[derive(Debug, Deserialize)]
struct RawTask {
    #[serde(default)]
    name: Option<String>,

    #[serde(rename = "type", alias = "kind", default)]
    kind: Option<String>,

    #[serde(default)]
    priority: Option<i64>,

    #[serde(alias = "description", default)]
    details: Option<String>,

    #[serde(default)]
    dependencies: Option<Vec<String>>,

    #[serde(default)]
    estimated_effort: Option<String>,

    #[serde(default)]
    file: Option<String>,

    #[serde(default)]
    blocks_goal: Option<bool>,
}

pub fn build_user_prompt(goal: &str, ctx: &RepoContext, issues: &[Issue]) -> String {
    let mut out = format!("Goal: {}\n", goal);

    out.push_str(&format!(
        "\nTracked files ({} total):\n",
        ctx.tracked_files.len()
    ));
    for f in ctx.tracked_files.iter().take(MAX_PROMPT_FILES) {
        out.push_str("- ");
        out.push_str(f);
        out.push('\n');
    }
    if ctx.tracked_files.len() > MAX_PROMPT_FILES {
        out.push_str(&format!(
            "- ... {} more\n",
            ctx.tracked_files.len() - MAX_PROMPT_FILES
        ));
    }

    if let Some(map) = ctx.repo_map.as_deref().filter(|m| !m.trim().is_empty()) {
        out.push_str("\nRepository map:\n");
        out.push_str(map.trim_end());
        out.push('\n');
    }

    out.push_str("\nKnown issues:\n");
    if issues.is_empty() {
        out.push_str("none\n");
    }
    for issue in issues {
        out.push_str(&format!(
            "- [{}] {}: {}",
            severity_label(issue.severity),
            category_label(issue.category),
            issue.details.trim()
        ));
        if let Some(file) = &issue.file {
            out.push_str(&format!(" ({})", file));
        }
        out.push('\n');
    }

    out
}

fn severity_label(s: Severity) -> &'static str {
    match s {
        Severity::High => "high",
        Severity::Medium => "medium",
        Severity::Low => "low",
    }
}

fn category_label(c: IssueCategory) -> &'static str {
    match c {
        IssueCategory::Lint => "lint",
        IssueCategory::Test => "test",
        IssueCategory::Security => "security",
    }
}

fn strip_code_fences(text: &str) -> &str {
    let Some(start) = text.find("```") else {
        return text.trim();
    };
    let after = &text[start + 3..];
    // Skip the language tag line (```json).
    let body = match after.find('\n') {
        Some(nl) => &after[nl + 1..],
        None => after,
    };
    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// The outermost `[` ... `]` span of a response, after removing Markdown fences.
pub fn extract_json_array(text: &str) -> Result<&str, PlanParseError> {
    let body = strip_code_fences(text);
    match (body.find('['), body.rfind(']')) {
        (Some(start), Some(end)) if start < end => Ok(&body[start..=end]),
        _ => Err(PlanParseError::NoArray),
    }
}

/// Apply the priority discipline to one task.
pub fn normalize_priority(kind: TaskKind, priority: Option<i64>, blocks_goal: bool) -> u32 {
    let p = priority
        .map(|p| p.clamp(1, i64::from(u32::MAX)) as u32)
        .unwrap_or(DEFAULT_PRIORITY);

    if kind == TaskKind::FeatureImplementation {
        1
    } else if kind.is_fix() && blocks_goal {
        p.clamp(1, 2)
    } else if kind.is_fix() {
        p.max(UNRELATED_FIX_PRIORITY)
    } else {
        p
    }
}

/// Parse a delegate response into tasks. Either every entry is valid or nothing is returned.
pub fn parse_plan(text: &str) -> Result<Vec<Task>, PlanParseError> {
    let array = extract_json_array(text)?;
    let raw: Vec<RawTask> = serde_json::from_str(array)?;
    if raw.is_empty() {
        return Err(PlanParseError::NoTasks);
    }

    raw.into_iter()
        .enumerate()
        .map(|(index, r)| into_task(index, r))
        .collect()
}

fn into_task(index: usize, raw: RawTask) -> Result<Task, PlanParseError> {
    let invalid = |reason: String| PlanParseError::InvalidEntry { index, reason };

    let name = raw.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(invalid("missing name".into()));
    }
    let kind: TaskKind = raw
        .kind
        .as_deref()
        .ok_or_else(|| invalid("missing type".into()))?
        .parse()
        .map_err(invalid)?;
    let blocks_goal = raw.blocks_goal.unwrap_or_default();
    let details = raw
        .details
        .ok_or_else(|| invalid("missing details".into()))?;

    let estimated_effort = match raw.estimated_effort.as_deref() {
        None => Effort::default(),
        Some(e) => e.parse().unwrap_or_else(|_| {
            tracing::debug!(target: "genius.planner", effort = %e, "unknown effort; using medium");
            Effort::default()
        }),
    };

    let mut task = Task::new(
        name,
        kind,
        normalize_priority(kind, raw.priority, blocks_goal),
        details,
    )
    .with_dependencies(
        raw.dependencies
            .unwrap_or_default()
            .iter()
            .map(|d| d.trim())
            .filter(|d| !d.is_empty() && *d != name),
    );
    task.estimated_effort = estimated_effort;
    task.blocks_goal = blocks_goal;
    task.file = raw.file.filter(|f| !f.trim().is_empty());
    Ok(task)
}

/// Ask the delegate for a plan and parse it.
pub async fn request_plan(
    delegate: &dyn PlanningDelegate,
    goal: &str,
    ctx: &RepoContext,
    issues: &[Issue],
) -> Result<Vec<Task>, PlanParseError> {
    let user = build_user_prompt(goal, ctx, issues);
    let text = delegate
        .complete(SYSTEM_PROMPT, &user)
        .await
        .map_err(|e| PlanParseError::Delegate(format!("{:#}", e)))?
        .filter(|t| !t.trim().is_empty())
        .ok_or(PlanParseError::EmptyResponse)?;
    parse_plan(&text)
}
