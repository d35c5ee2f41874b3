//! Task records, the task arena and dependency resolution.
//!
//! ```text
//! Vec<Task> (planner output, unique names)
//!   ↓
//! TaskGraph::from_tasks()   arena + name index + reverse edges
//!   ↓
//! resolve()                 ready/blocked passes, forced pick on deadlock
//!   ↓
//! Resolution { order, forced, passes }
//! ```

mod graph;
mod resolve;
mod types;

pub use graph::{TaskGraph, TaskId};
pub use resolve::{resolve, ForcedTask, Resolution};
pub use types::{Effort, Issue, IssueCategory, RepoContext, Severity, Task, TaskKind};
