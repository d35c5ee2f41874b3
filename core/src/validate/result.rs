use serde::{Deserialize, Serialize};

/// Outcome of one validation pass. Recomputed on every cycle, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub lint_passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint_output: Option<String>,

    pub tests_passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_output: Option<String>,

    pub security_passed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_output: Option<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::all_clear()
    }
}

impl ValidationResult {
    /// Every check passed (or was not configured).
    pub fn all_clear() -> Self {
        Self {
            lint_passed: true,
            lint_output: None,
            tests_passed: true,
            test_output: None,
            security_passed: true,
            security_output: None,
        }
    }

    /// Overall verdict: logical AND of the three checks.
    pub fn passed(&self) -> bool {
        self.lint_passed && self.tests_passed && self.security_passed
    }

    /// Non-empty diagnostic payloads concatenated into one error-context string.
    pub fn error_context(&self) -> Option<String> {
        let sections: Vec<String> = [
            ("Lint errors", self.lint_output.as_deref()),
            ("Test failures", self.test_output.as_deref()),
            ("Security issues", self.security_output.as_deref()),
        ]
        .into_iter()
        .filter_map(|(title, body)| {
            body.map(str::trim)
                .filter(|b| !b.is_empty())
                .map(|b| format!("{}:\n{}", title, b))
        })
        .collect();

        if sections.is_empty() {
            None
        } else {
            Some(sections.join("\n\n"))
        }
    }

    pub fn failed_checks(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.lint_passed {
            out.push("lint");
        }
        if !self.tests_passed {
            out.push("tests");
        }
        if !self.security_passed {
            out.push("security");
        }
        out
    }
}
