use std::collections::HashMap;

use serde::Serialize;

use crate::error::GeniusError;

use super::types::Task;

/// Index of a task inside a [`TaskGraph`]; also its planner emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TaskId(usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Task arena plus the dependency edges between its records.
///
/// Tasks keep their planner emission order; that order is the stable
/// tie-break used everywhere a deterministic ordering is needed.
#[derive(Debug, Clone, Default)]
pub struct TaskGraph {
    tasks: Vec<Task>,

    /// Task name -> arena index
    index: HashMap<String, TaskId>,

    /// Dependents: task -> tasks that declared it as a dependency
    reverse_edges: HashMap<TaskId, Vec<TaskId>>,
}

impl TaskGraph {
    /// Construct the arena from planner output. Names must already be unique.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, GeniusError> {
        let mut index = HashMap::with_capacity(tasks.len());

        for (i, task) in tasks.iter().enumerate() {
            if index.insert(task.name.clone(), TaskId(i)).is_some() {
                return Err(GeniusError::PlanningFailure(format!(
                    "duplicate task name: {}",
                    task.name
                )));
            }
        }

        let mut reverse_edges: HashMap<TaskId, Vec<TaskId>> = HashMap::new();
        for (i, task) in tasks.iter().enumerate() {
            for dep in &task.dependencies {
                if let Some(dep_id) = index.get(dep) {
                    reverse_edges.entry(*dep_id).or_default().push(TaskId(i));
                }
            }
        }

        Ok(Self {
            tasks,
            index,
            reverse_edges,
        })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> &Task {
        &self.tasks[id.0]
    }

    pub fn get_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id.0]
    }

    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.index.get(name).copied()
    }

    /// Ids in emission order.
    pub fn ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        (0..self.tasks.len()).map(TaskId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskId(i), t))
    }

    pub fn dependents(&self, id: TaskId) -> &[TaskId] {
        self.reverse_edges
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Declared dependency names that do not name any task in the graph.
    pub fn missing_dependencies(&self, id: TaskId) -> Vec<&str> {
        self.get(id)
            .dependencies
            .iter()
            .filter(|dep| !self.index.contains_key(dep.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn names<'a>(&'a self, ids: &'a [TaskId]) -> impl Iterator<Item = String> + 'a {
        ids.iter().map(move |id| self.get(*id).name.clone())
    }
}
