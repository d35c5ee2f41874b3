//! Top-level driver: plan, resolve, then iterate execute → validate → feedback.
//!
//! ```text
//! Planning ──(tasks)──▶ Iterating ──(nothing left | budget spent)──▶ Done
//!     └──────────(planning failure)──────────────────────────────────▶ Done
//! ```
//!
//! Exactly one task is executed and validated at a time; every collaborator
//! call is awaited before the next one starts.

mod report;
mod state;

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::context::Services;
use crate::error::GeniusError;
use crate::executor::Executor;
use crate::feedback::{ContextMemory, Decision, FeedbackController};
use crate::planner::Planner;
use crate::progress::ProgressMonitor;
use crate::task::{resolve, Issue, IssueCategory, RepoContext, Severity, Task, TaskGraph, TaskId};
use crate::validate::{ValidationResult, Validator};

pub use report::ExecutionReport;
pub use state::{LoopPhase, LoopTransition, TransitionError};

/// What one pass of the loop did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Completed,
    Retry,
    Failed,
}

pub struct Orchestrator {
    cfg: AppConfig,
    services: Services,
    planner: Planner,
    executor: Executor,
    validator: Validator,
    feedback: FeedbackController,
    memory: ContextMemory,

    phase: LoopPhase,
    graph: TaskGraph,
    order: Vec<TaskId>,
    /// Forced tasks and the dependency names they may run without.
    forced: HashMap<TaskId, Vec<String>>,
    completed: Vec<TaskId>,
    failed: Vec<TaskId>,
    terminal: HashSet<TaskId>,
    iterations: u32,
    last_validation: Option<ValidationResult>,

    run_id: String,
    goal: Option<String>,
    started_at: DateTime<Utc>,
    report: Option<ExecutionReport>,
}

impl Orchestrator {
    pub fn new(cfg: AppConfig, services: Services) -> Self {
        let planner = Planner::new(if cfg.planner.enabled {
            services.planner.clone()
        } else {
            None
        });
        let executor = Executor::new(
            services.editor.clone(),
            services.search.clone(),
            cfg.search.max_results_per_query,
        );
        let validator = Validator::new(
            cfg.validation.clone(),
            services.repository.clone(),
            services.linter.clone(),
            services.test_runner.clone(),
            services.security.clone(),
        );
        let feedback = FeedbackController::new(cfg.orchestrator.max_retries);
        let memory =
            ContextMemory::with_previous_errors(cfg.orchestrator.previous_errors.iter().cloned());

        Self {
            cfg,
            services,
            planner,
            executor,
            validator,
            feedback,
            memory,
            phase: LoopPhase::Planning,
            graph: TaskGraph::default(),
            order: Vec::new(),
            forced: HashMap::new(),
            completed: Vec::new(),
            failed: Vec::new(),
            terminal: HashSet::new(),
            iterations: 0,
            last_validation: None,
            run_id: uuid::Uuid::new_v4().to_string(),
            goal: None,
            started_at: Utc::now(),
            report: None,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn memory(&self) -> &ContextMemory {
        &self.memory
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    pub fn report(&self) -> Option<&ExecutionReport> {
        self.report.as_ref()
    }

    /// Names of tasks the resolver had to force ready.
    pub fn forced_tasks(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.forced.contains_key(id))
            .map(|id| self.graph.get(*id).name.clone())
            .collect()
    }

    /// Repository context and known issues handed to the planner.
    pub async fn analyze(&mut self) -> (RepoContext, Vec<Issue>) {
        tracing::info!(
            target: "genius.plan",
            phase = "planning",
            action = "analyze repository",
            reasoning = "gather repo context before planning"
        );

        let repo = &self.services.repository;
        let tracked_files = repo.tracked_files().await.unwrap_or_else(|e| {
            tracing::warn!(target: "genius.plan", error = %e, "could not list tracked files");
            Vec::new()
        });
        let dirty = repo.is_dirty().await.unwrap_or_else(|e| {
            tracing::warn!(target: "genius.plan", error = %e, "could not read repository status");
            false
        });
        let repo_map = if self.cfg.repo.repo_map {
            repo.repo_map().await.unwrap_or_else(|e| {
                tracing::warn!(target: "genius.plan", error = %e, "could not build repository map");
                None
            })
        } else {
            None
        };

        let mut issues: Vec<Issue> = self
            .memory
            .previous_errors
            .iter()
            .map(|e| Issue::new(IssueCategory::Test, Severity::Medium, e.clone()))
            .collect();

        if self.cfg.orchestrator.analyze_before_planning {
            let baseline = self.validator.validate().await;
            self.memory.record_validation(&baseline);
            issues.extend(issues_from_validation(&baseline));
        }

        tracing::debug!(
            target: "genius.plan",
            files = tracked_files.len(),
            dirty,
            issues = issues.len(),
            "repository analysed"
        );

        (
            RepoContext {
                tracked_files,
                dirty,
                repo_map,
            },
            issues,
        )
    }

    /// Analyze, plan and resolve. Returns the tasks in execution order.
    pub async fn plan(&mut self, goal: Option<&str>) -> Result<Vec<Task>, GeniusError> {
        let (ctx, issues) = self.analyze().await;
        let tasks = self.planner.plan(goal, &ctx, &issues).await?;
        let graph = TaskGraph::from_tasks(tasks)?;
        let resolution = resolve(&graph);

        tracing::info!(
            target: "genius.resolve",
            phase = "planning",
            action = "resolve dependencies",
            reasoning = "order tasks so prerequisites run first",
            tasks = graph.len(),
            passes = resolution.passes,
            forced = resolution.forced.len()
        );

        self.order = resolution.order;
        self.forced = resolution
            .forced
            .into_iter()
            .map(|f| (f.id, f.waived))
            .collect();
        self.graph = graph;
        Ok(self
            .order
            .iter()
            .map(|id| self.graph.get(*id).clone())
            .collect())
    }

    /// Run the whole loop. Only a planning failure is returned as an error; every
    /// other outcome is described by the report.
    pub async fn run(&mut self, goal: Option<&str>) -> Result<ExecutionReport, GeniusError> {
        self.reset(goal);
        let progress = ProgressMonitor::new(
            self.cfg.orchestrator.max_iterations,
            self.cfg.orchestrator.progress_bar,
        );
        self.run_inner(goal, progress).await
    }

    async fn run_inner(
        &mut self,
        goal: Option<&str>,
        mut progress: ProgressMonitor,
    ) -> Result<ExecutionReport, GeniusError> {
        if let Err(e) = self.plan(goal).await {
            self.transition(LoopPhase::Done, "stop", "planning failed; nothing to run");
            tracing::error!(target: "genius.loop", error = %e, "run aborted during planning");
            progress.finish(false);
            return Err(e);
        }

        self.transition(
            LoopPhase::Iterating,
            "start iterating",
            "tasks planned and ordered",
        );
        progress.set_message("iterating");

        let max_iterations = self.cfg.orchestrator.max_iterations;
        let mut stall_logged = false;

        while self.iterations < max_iterations {
            let Some(id) = self.next_task() else {
                if self.pending().is_empty() {
                    break;
                }
                self.iterations += 1;
                progress.tick();
                if !stall_logged {
                    stall_logged = true;
                    tracing::warn!(
                        target: "genius.loop",
                        pending = ?self.pending_names(),
                        "no eligible task: pending tasks wait on dependencies that have not completed"
                    );
                }
                continue;
            };

            self.iterations += 1;
            tracing::info!(
                target: "genius.loop",
                iteration = self.iterations,
                max_iterations,
                task = %self.graph.get(id).name,
                "iteration started"
            );
            let pass = self.step(id, &mut progress).await;
            progress.tick();
            tracing::debug!(target: "genius.loop", ?pass, "iteration finished");
        }

        let pending = self.pending();
        if !pending.is_empty() && self.iterations >= max_iterations {
            tracing::warn!(
                target: "genius.loop",
                iterations = self.iterations,
                pending = ?self.pending_names(),
                "iteration budget exhausted with tasks outstanding"
            );
        }

        self.transition(
            LoopPhase::Done,
            "build report",
            if pending.is_empty() {
                "no tasks left to run"
            } else {
                "iteration budget exhausted"
            },
        );

        let report = self.build_report();
        progress.finish(report.success);
        tracing::info!(
            target: "genius.loop",
            run_id = %report.run_id,
            iterations = report.iterations,
            completed = report.completed.len(),
            failed = report.failed.len(),
            pending = report.pending.len(),
            success = report.success,
            "run finished"
        );
        self.report = Some(report.clone());
        Ok(report)
    }

    async fn step(&mut self, id: TaskId, progress: &mut ProgressMonitor) -> Pass {
        let name = self.graph.get(id).name.clone();
        let prior_error = self.feedback.context_for(&name).map(str::to_owned);
        progress.start_task(&name, self.graph.get(id).retry_count);

        let edited = self
            .executor
            .execute(self.graph.get(id), prior_error.as_deref(), &self.memory)
            .await;
        if !edited {
            // Editor failures are not retried.
            self.mark_failed(id, "edit failure");
            progress.finish_task(&name, "edit failed", false);
            return Pass::Failed;
        }

        let result = self.validator.validate().await;
        self.memory.record_validation(&result);
        self.last_validation = Some(result.clone());

        if result.passed() {
            self.mark_completed(id);
            progress.finish_task(&name, "completed", true);
            self.commit_if_dirty(&name).await;
            return Pass::Completed;
        }

        let task = self.graph.get_mut(id);
        match self.feedback.on_failure(task, &result, &mut self.memory) {
            Decision::Retry => {
                progress.finish_task(&name, "retry", false);
                Pass::Retry
            }
            Decision::Abandon => {
                self.mark_failed(id, "retry budget exhausted");
                progress.finish_task(&name, "failed", false);
                Pass::Failed
            }
        }
    }

    /// First non-terminal task in resolved order whose dependencies have all completed.
    /// A forced task may skip only the dependencies that were unresolved when the
    /// resolver forced it.
    fn next_task(&self) -> Option<TaskId> {
        self.order
            .iter()
            .copied()
            .filter(|id| !self.terminal.contains(id))
            .find(|id| self.dependencies_completed(*id))
    }

    fn is_waived(&self, id: TaskId, dep: &str) -> bool {
        self.forced
            .get(&id)
            .is_some_and(|waived| waived.iter().any(|w| w == dep))
    }

    fn dependencies_completed(&self, id: TaskId) -> bool {
        self.graph.get(id).dependencies.iter().all(|dep| {
            self.is_waived(id, dep)
                || self
                    .graph
                    .find(dep)
                    .is_some_and(|dep_id| self.completed.contains(&dep_id))
        })
    }

    fn pending(&self) -> Vec<TaskId> {
        self.order
            .iter()
            .copied()
            .filter(|id| !self.terminal.contains(id))
            .collect()
    }

    fn pending_names(&self) -> Vec<String> {
        let pending = self.pending();
        self.graph.names(&pending).collect()
    }

    fn mark_completed(&mut self, id: TaskId) {
        let name = self.graph.get(id).name.clone();
        self.feedback.on_success(&name);
        self.completed.push(id);
        self.terminal.insert(id);
        tracing::info!(
            target: "genius.loop",
            phase = "decision",
            action = "task completed",
            reasoning = "all validation checks passed",
            task = %name
        );
    }

    fn mark_failed(&mut self, id: TaskId, reason: &str) {
        let name = self.graph.get(id).name.clone();
        self.feedback.forget(&name);
        self.failed.push(id);
        self.terminal.insert(id);
        tracing::warn!(
            target: "genius.loop",
            phase = "decision",
            action = "task failed",
            reasoning = reason,
            task = %name
        );

        let blocked: Vec<TaskId> = self
            .graph
            .dependents(id)
            .iter()
            .copied()
            .filter(|d| !self.terminal.contains(d) && !self.is_waived(*d, &name))
            .collect();
        if !blocked.is_empty() {
            let blocked: Vec<String> = self.graph.names(&blocked).collect();
            tracing::warn!(
                target: "genius.loop",
                task = %name,
                blocked = ?blocked,
                "dependent tasks can no longer be scheduled"
            );
        }
    }

    async fn commit_if_dirty(&self, task_name: &str) {
        if !self.cfg.repo.auto_commit {
            return;
        }
        let repo = &self.services.repository;
        match repo.is_dirty().await {
            Ok(true) => {
                let message = format!("genius: complete task '{}'", task_name);
                match repo.commit(&message).await {
                    Ok(()) => tracing::info!(
                        target: "genius.loop",
                        phase = "commit",
                        action = "commit changes",
                        reasoning = "task completed with uncommitted changes",
                        task = %task_name
                    ),
                    Err(e) => {
                        tracing::warn!(target: "genius.loop", task = %task_name, error = %e, "commit failed")
                    }
                }
            }
            Ok(false) => {
                tracing::debug!(target: "genius.loop", task = %task_name, "nothing to commit")
            }
            Err(e) => {
                tracing::warn!(target: "genius.loop", error = %e, "could not read repository status")
            }
        }
    }

    fn transition(&mut self, to: LoopPhase, action: &str, reasoning: &str) {
        match LoopTransition::validate(self.phase, to) {
            Ok(()) => {
                tracing::info!(
                    target: "genius.loop",
                    phase = LoopTransition::describe(to),
                    action,
                    reasoning,
                    from = LoopTransition::describe(self.phase)
                );
                self.phase = to;
            }
            Err(e) => tracing::error!(target: "genius.loop", error = %e, "phase transition rejected"),
        }
    }

    fn reset(&mut self, goal: Option<&str>) {
        self.phase = LoopPhase::Planning;
        self.graph = TaskGraph::default();
        self.order.clear();
        self.forced.clear();
        self.completed.clear();
        self.failed.clear();
        self.terminal.clear();
        self.iterations = 0;
        self.last_validation = None;
        self.feedback = FeedbackController::new(self.cfg.orchestrator.max_retries);
        self.run_id = uuid::Uuid::new_v4().to_string();
        self.goal = goal.map(str::trim).filter(|g| !g.is_empty()).map(str::to_string);
        self.started_at = Utc::now();
        self.report = None;
    }

    fn build_report(&self) -> ExecutionReport {
        let completed: Vec<String> = self.graph.names(&self.completed).collect();
        let failed: Vec<String> = self.graph.names(&self.failed).collect();
        let pending = self.pending_names();
        let success =
            ExecutionReport::compute_success(&completed, self.last_validation.as_ref());

        ExecutionReport {
            run_id: self.run_id.clone(),
            goal: self.goal.clone(),
            iterations: self.iterations,
            completed,
            failed,
            pending,
            final_validation: self.last_validation.clone(),
            success,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

/// Known issues derived from a baseline validation run.
fn issues_from_validation(result: &ValidationResult) -> Vec<Issue> {
    let mut issues = Vec::new();
    if !result.tests_passed {
        issues.push(Issue::new(
            IssueCategory::Test,
            Severity::High,
            result
                .test_output
                .clone()
                .unwrap_or_else(|| "test suite failing".into()),
        ));
    }
    if !result.lint_passed {
        issues.push(Issue::new(
            IssueCategory::Lint,
            Severity::Medium,
            result
                .lint_output
                .clone()
                .unwrap_or_else(|| "lint errors".into()),
        ));
    }
    if !result.security_passed {
        issues.push(Issue::new(
            IssueCategory::Security,
            Severity::High,
            result
                .security_output
                .clone()
                .unwrap_or_else(|| "risky constructs found".into()),
        ));
    }
    issues
}
