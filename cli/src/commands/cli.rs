use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "genius", version, about = "Plan, edit, validate and retry until the goal is met")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to ~/.genius/config.toml, then ./genius.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Repository root the editor, tests and git run in.
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    /// What to achieve. Falls back to the configured default goal.
    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub max_iterations: Option<u32>,

    #[arg(long)]
    pub max_retries: Option<u32>,

    #[arg(long)]
    pub test_cmd: Option<String>,

    /// Lint command; the file path is appended.
    #[arg(long)]
    pub lint_cmd: Option<String>,

    #[arg(long)]
    pub no_lint: bool,

    #[arg(long)]
    pub no_security_scan: bool,

    #[arg(long)]
    pub no_commit: bool,

    /// Skip the planning delegate and use the rule-based plan.
    #[arg(long)]
    pub no_planner: bool,

    /// Enrich instructions with web search (needs SERPER_API_KEY).
    #[arg(long)]
    pub web_search: bool,

    /// Run the validator before planning to discover existing issues.
    #[arg(long)]
    pub analyze: bool,

    /// Error from an earlier session, carried into planning. Repeatable.
    #[arg(long = "previous-error", action = clap::ArgAction::Append)]
    pub previous_errors: Vec<String>,

    #[arg(long)]
    pub progress: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long)]
    pub goal: Option<String>,

    #[arg(long)]
    pub no_planner: bool,

    #[arg(long)]
    pub analyze: bool,

    #[arg(long)]
    pub test_cmd: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full plan/execute/validate loop.
    Run(RunArgs),
    /// Plan and order tasks without touching the tree.
    Plan(PlanArgs),
}
