use std::collections::HashSet;

use crate::error::GeniusError;

use super::graph::{TaskGraph, TaskId};

/// A task forced ready to break a deadlock (cycle or unknown dependency).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForcedTask {
    pub id: TaskId,

    /// Dependencies still unresolved when the task was forced. Only these may be
    /// skipped at selection time; every other dependency must still complete.
    pub waived: Vec<String>,
}

/// Output of dependency resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Total execution order over every task in the graph.
    pub order: Vec<TaskId>,

    pub forced: Vec<ForcedTask>,

    /// Number of ready/blocked partition passes performed.
    pub passes: usize,
}

/// Order tasks so that every task follows its dependencies.
///
/// Each pass partitions the remaining tasks into ready (all dependencies already
/// resolved) and blocked, then appends the ready ones sorted by
/// `(priority, emission index)`. When a pass finds nothing ready the single most
/// urgent remaining task is forced ready, so `n` tasks resolve in at most `n`
/// passes and none are dropped.
pub fn resolve(graph: &TaskGraph) -> Resolution {
    let mut remaining: Vec<TaskId> = graph.ids().collect();
    let mut resolved: HashSet<&str> = HashSet::with_capacity(graph.len());
    let mut out = Resolution::default();

    let sort_key = |id: &TaskId| (graph.get(*id).priority, id.index());

    while !remaining.is_empty() {
        out.passes += 1;

        let (mut ready, mut blocked): (Vec<TaskId>, Vec<TaskId>) =
            remaining.iter().partition(|id| {
                graph
                    .get(**id)
                    .dependencies
                    .iter()
                    .all(|dep| resolved.contains(dep.as_str()))
            });

        if ready.is_empty() {
            // Non-empty: `remaining` is non-empty and everything in it is blocked.
            let Some(pick) = blocked.iter().copied().min_by_key(sort_key) else {
                break;
            };
            let task = graph.get(pick);
            let deadlock = GeniusError::DependencyDeadlock(format!(
                "no task ready among {} remaining; forcing '{}'",
                blocked.len(),
                task.name
            ));
            tracing::warn!(
                target: "genius.resolve",
                task = %task.name,
                priority = task.priority,
                missing = ?graph.missing_dependencies(pick),
                "{}",
                deadlock
            );
            let waived = task
                .dependencies
                .iter()
                .filter(|dep| !resolved.contains(dep.as_str()))
                .cloned()
                .collect();
            blocked.retain(|id| *id != pick);
            out.forced.push(ForcedTask { id: pick, waived });
            ready.push(pick);
        }

        ready.sort_by_key(sort_key);
        for id in &ready {
            resolved.insert(graph.get(*id).name.as_str());
        }
        tracing::debug!(
            target: "genius.resolve",
            pass = out.passes,
            ready = ?graph.names(&ready).collect::<Vec<_>>(),
            blocked = blocked.len()
        );
        out.order.extend(ready);
        remaining = blocked;
    }

    out
}
