use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    #[serde(default)]
    pub validation: ValidationConfig,

    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub planner: PlannerConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub repo: RepoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or `~/.genius/logs` if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "genius_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses `~/.genius/logs`.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Iteration budget; each execute+validate cycle (or stalled pass) costs one.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Validation failures tolerated per task before it is abandoned.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Goal used when none is given on the command line.
    #[serde(default)]
    pub default_goal: Option<String>,

    /// Run the validator once before planning to discover existing issues.
    #[serde(default)]
    pub analyze_before_planning: bool,

    /// Errors from earlier sessions, carried into planning as known issues.
    #[serde(default)]
    pub previous_errors: Vec<String>,

    #[serde(default)]
    pub progress_bar: bool,
}

fn default_max_iterations() -> u32 {
    5
}

fn default_max_retries() -> u32 {
    2
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            max_retries: default_max_retries(),
            default_goal: None,
            analyze_before_planning: false,
            previous_errors: Vec::new(),
            progress_bar: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default = "default_true")]
    pub auto_lint: bool,

    /// Lint command; the file path is appended as the last argument.
    #[serde(default)]
    pub lint_cmd: Option<String>,

    #[serde(default = "default_true")]
    pub auto_test: bool,

    #[serde(default)]
    pub test_cmd: Option<String>,

    #[serde(default = "default_true")]
    pub security_scan: bool,

    /// Extensions (without dot) treated as source files for lint and security scans.
    #[serde(default = "default_source_extensions")]
    pub source_extensions: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_source_extensions() -> Vec<String> {
    ["py", "js", "ts", "rb", "php", "sh", "rs", "go", "java"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            auto_lint: true,
            lint_cmd: None,
            auto_test: true,
            test_cmd: None,
            security_scan: true,
            source_extensions: default_source_extensions(),
        }
    }
}

impl ValidationConfig {
    pub fn is_source_file(&self, path: &str) -> bool {
        std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.source_extensions.iter().any(|s| s == ext))
            .unwrap_or(false)
    }

    pub fn tests_enabled(&self) -> bool {
        self.auto_test
            && self
                .test_cmd
                .as_deref()
                .map(|c| !c.trim().is_empty())
                .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Code-editing command; the instruction message is appended as the last argument.
    #[serde(default = "default_editor_cmd")]
    pub cmd: String,

    #[serde(default = "default_editor_args")]
    pub args: Vec<String>,

    #[serde(default = "default_editor_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_editor_cmd() -> String {
    "aider".to_string()
}

fn default_editor_args() -> Vec<String> {
    vec![
        "--yes-always".to_string(),
        "--no-auto-commits".to_string(),
        "--message".to_string(),
    ]
}

fn default_editor_timeout_ms() -> u64 {
    900_000
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            cmd: default_editor_cmd(),
            args: default_editor_args(),
            timeout_ms: default_editor_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OpenAI-compatible API root, e.g. "https://api.openai.com/v1".
    #[serde(default = "default_planner_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_planner_model")]
    pub model: String,

    #[serde(default = "default_planner_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_planner_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_planner_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_planner_timeout_ms() -> u64 {
    60_000
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_planner_url(),
            api_key: String::new(),
            model: default_planner_model(),
            timeout_ms: default_planner_timeout_ms(),
        }
    }
}

impl PlannerConfig {
    /// The delegate is only built when enabled and a key is present.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty() && !self.base_url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_search_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_search_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_results_per_query")]
    pub max_results_per_query: usize,
}

fn default_search_url() -> String {
    "https://google.serper.dev/search".to_string()
}

fn default_search_timeout_ms() -> u64 {
    10_000
}

fn default_max_results_per_query() -> usize {
    2
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_search_url(),
            api_key: String::new(),
            timeout_ms: default_search_timeout_ms(),
            max_results_per_query: default_max_results_per_query(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoConfig {
    #[serde(default = "default_repo_root")]
    pub root: String,

    #[serde(default = "default_true")]
    pub auto_commit: bool,

    /// Include a file-tree map of the repository in the planning context.
    #[serde(default = "default_true")]
    pub repo_map: bool,
}

fn default_repo_root() -> String {
    ".".to_string()
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            root: default_repo_root(),
            auto_commit: true,
            repo_map: true,
        }
    }
}
