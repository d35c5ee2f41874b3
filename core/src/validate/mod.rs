//! Lint, test and security checks aggregated into one verdict.
//!
//! The three checks run one after another and never short-circuit: an error or
//! panic inside one check is recorded as that check's failure and the others
//! still run.

mod result;
mod security;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::collab::{Linter, Repository, SecurityScanner, TestRunner};
use crate::config::ValidationConfig;

pub use result::ValidationResult;
pub use security::{format_findings, PatternScanner};

/// Result of a single check: `Ok(None)` passed, `Ok(Some(_))` failed with diagnostics.
type CheckResult = anyhow::Result<Option<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CheckOutcome {
    passed: bool,
    diagnostics: Option<String>,
}

impl CheckOutcome {
    fn skipped() -> Self {
        Self {
            passed: true,
            diagnostics: None,
        }
    }
}

pub struct Validator {
    cfg: ValidationConfig,
    repository: Arc<dyn Repository>,
    linter: Option<Arc<dyn Linter>>,
    test_runner: Option<Arc<dyn TestRunner>>,
    security: Option<Arc<dyn SecurityScanner>>,
}

impl Validator {
    pub fn new(
        cfg: ValidationConfig,
        repository: Arc<dyn Repository>,
        linter: Option<Arc<dyn Linter>>,
        test_runner: Option<Arc<dyn TestRunner>>,
        security: Option<Arc<dyn SecurityScanner>>,
    ) -> Self {
        Self {
            cfg,
            repository,
            linter,
            test_runner,
            security,
        }
    }

    pub async fn validate(&self) -> ValidationResult {
        tracing::info!(
            target: "genius.validate",
            phase = "validation",
            action = "run lint, tests and security scan",
            reasoning = "ensure code quality before accepting the change"
        );

        let files = match self.repository.tracked_files().await {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(
                    target: "genius.validate",
                    error = %e,
                    "could not list tracked files; file-based checks see an empty tree"
                );
                Vec::new()
            }
        };
        let sources: Vec<String> = files
            .into_iter()
            .filter(|f| self.cfg.is_source_file(f))
            .collect();

        let lint = self.lint(&sources).await;
        let tests = self.tests().await;
        let security = self.security(&sources).await;

        let result = ValidationResult {
            lint_passed: lint.passed,
            lint_output: lint.diagnostics,
            tests_passed: tests.passed,
            test_output: tests.diagnostics,
            security_passed: security.passed,
            security_output: security.diagnostics,
        };

        tracing::info!(
            target: "genius.validate",
            lint_passed = result.lint_passed,
            tests_passed = result.tests_passed,
            security_passed = result.security_passed,
            passed = result.passed()
        );
        result
    }

    async fn lint(&self, files: &[String]) -> CheckOutcome {
        if !self.cfg.auto_lint || files.is_empty() {
            return CheckOutcome::skipped();
        }
        let Some(linter) = self.linter.clone() else {
            tracing::debug!(target: "genius.validate", "auto-lint enabled but no linter configured");
            return CheckOutcome::skipped();
        };

        run_check("lint", async move {
            let mut diagnostics = Vec::new();
            for file in files {
                if let Some(out) = linter.lint(file).await? {
                    diagnostics.push(format!("## {}\n{}", file, out.trim_end()));
                }
            }
            Ok(if diagnostics.is_empty() {
                None
            } else {
                Some(diagnostics.join("\n\n"))
            })
        })
        .await
    }

    async fn tests(&self) -> CheckOutcome {
        if !self.cfg.tests_enabled() {
            return CheckOutcome::skipped();
        }
        let (Some(runner), Some(cmd)) = (self.test_runner.clone(), self.cfg.test_cmd.clone())
        else {
            tracing::debug!(target: "genius.validate", "test command set but no test runner configured");
            return CheckOutcome::skipped();
        };

        run_check("tests", async move { runner.run_tests(&cmd).await }).await
    }

    async fn security(&self, files: &[String]) -> CheckOutcome {
        if !self.cfg.security_scan {
            return CheckOutcome::skipped();
        }
        let Some(scanner) = self.security.clone() else {
            return CheckOutcome::skipped();
        };

        run_check("security", async move {
            let findings = scanner.scan(files).await?;
            for f in &findings {
                tracing::warn!(
                    target: "genius.validate",
                    file = %f.file,
                    line = f.line,
                    construct = f.construct.describe(),
                    "risky construct flagged"
                );
            }
            Ok(if findings.is_empty() {
                None
            } else {
                Some(format_findings(&findings))
            })
        })
        .await
    }
}

/// Run one check, turning errors and panics into a failed outcome for that check only.
async fn run_check<F>(check: &'static str, fut: F) -> CheckOutcome
where
    F: Future<Output = CheckResult>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(Ok(None)) => CheckOutcome {
            passed: true,
            diagnostics: None,
        },
        Ok(Ok(Some(diagnostics))) => CheckOutcome {
            passed: false,
            diagnostics: Some(diagnostics),
        },
        Ok(Err(e)) => {
            tracing::warn!(target: "genius.validate", check, error = %e, "check raised an error");
            CheckOutcome {
                passed: false,
                diagnostics: Some(format!("{} check raised an error: {:#}", check, e)),
            }
        }
        Err(_) => {
            tracing::error!(target: "genius.validate", check, "check panicked");
            CheckOutcome {
                passed: false,
                diagnostics: Some(format!("{} check panicked", check)),
            }
        }
    }
}
