//! Goal + repository context + known issues -> ordered task list.
//!
//! A configured planning delegate is tried first; any problem with its answer
//! falls back to the deterministic rules without surfacing to the caller.

mod delegate;
mod rules;

use std::collections::HashMap;
use std::sync::Arc;

use crate::collab::PlanningDelegate;
use crate::error::GeniusError;
use crate::task::{Issue, RepoContext, Task};

pub use delegate::{
    build_user_prompt, extract_json_array, normalize_priority, parse_plan, SYSTEM_PROMPT,
};
pub use rules::fallback_plan;

pub const DEFAULT_GOAL: &str = "Analyze and improve the codebase";

const GENERIC_GOAL_MARKER: &str = "analyze and improve";

pub fn is_generic_goal(goal: &str) -> bool {
    goal.to_lowercase().contains(GENERIC_GOAL_MARKER)
}

pub struct Planner {
    delegate: Option<Arc<dyn PlanningDelegate>>,
}

impl Planner {
    pub fn new(delegate: Option<Arc<dyn PlanningDelegate>>) -> Self {
        Self { delegate }
    }

    pub async fn plan(
        &self,
        goal: Option<&str>,
        ctx: &RepoContext,
        issues: &[Issue],
    ) -> Result<Vec<Task>, GeniusError> {
        let goal = goal
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .ok_or_else(|| GeniusError::PlanningFailure("no goal supplied".into()))?;

        let tasks = match &self.delegate {
            Some(delegate) => {
                match delegate::request_plan(delegate.as_ref(), goal, ctx, issues).await {
                    Ok(tasks) => {
                        tracing::info!(
                            target: "genius.plan",
                            phase = "planning",
                            action = "delegated plan accepted",
                            reasoning = "planning delegate returned a valid task list",
                            delegate = delegate.name(),
                            tasks = tasks.len()
                        );
                        tasks
                    }
                    Err(e) => {
                        tracing::info!(
                            target: "genius.plan",
                            phase = "planning",
                            action = "rule-based fallback",
                            reasoning = "delegated plan unusable",
                            delegate = delegate.name(),
                            error = %e
                        );
                        fallback_plan(goal, issues)
                    }
                }
            }
            None => {
                tracing::info!(
                    target: "genius.plan",
                    phase = "planning",
                    action = "rule-based plan",
                    reasoning = "no planning delegate configured"
                );
                fallback_plan(goal, issues)
            }
        };

        if tasks.is_empty() {
            return Err(GeniusError::PlanningFailure(
                "planner produced no tasks".into(),
            ));
        }
        Ok(dedupe_names(tasks))
    }
}

/// Rename repeated task names to `<name> #2`, `<name> #3`, ... keeping the first as-is.
pub fn dedupe_names(mut tasks: Vec<Task>) -> Vec<Task> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    for task in &tasks {
        seen.entry(task.name.clone()).or_insert(0);
    }

    let mut counts: HashMap<String, usize> = HashMap::new();
    for task in tasks.iter_mut() {
        let n = counts.entry(task.name.clone()).or_insert(0);
        *n += 1;
        if *n == 1 {
            continue;
        }
        let mut suffix = *n;
        let mut renamed = format!("{} #{}", task.name, suffix);
        while seen.contains_key(&renamed) {
            suffix += 1;
            renamed = format!("{} #{}", task.name, suffix);
        }
        tracing::warn!(
            target: "genius.plan",
            original = %task.name,
            renamed = %renamed,
            "duplicate task name renamed"
        );
        seen.insert(renamed.clone(), 0);
        task.name = renamed;
    }
    tasks
}
