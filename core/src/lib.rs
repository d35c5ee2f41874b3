//! genius-core: planning, dependency resolution, execution, validation and
//! feedback for an autonomous code-change loop.

pub mod api;
pub mod collab;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod feedback;
pub mod orchestrator;
pub mod planner;
pub mod progress;
pub mod task;
pub mod validate;
