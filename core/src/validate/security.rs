use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use regex::Regex;

use crate::collab::{RiskyConstruct, SecurityFinding, SecurityScanner};

const SNIPPET_LIMIT: usize = 120;

/// (construct, pattern, exemption substring on the same line)
const RULES: &[(RiskyConstruct, &str, Option<&str>)] = &[
    (RiskyConstruct::DynamicEvaluation, r"(?:^|[^.\w])eval\s*\(", None),
    (RiskyConstruct::DynamicEvaluation, r"(?:^|[^.\w])exec\s*\(", None),
    (RiskyConstruct::DynamicEvaluation, r"\bnew\s+Function\s*\(", None),
    (RiskyConstruct::ShellSubprocess, r"\bshell\s*=\s*True\b", None),
    (RiskyConstruct::ShellSubprocess, r"\bos\.(?:system|popen)\s*\(", None),
    (
        RiskyConstruct::ShellSubprocess,
        r"\bsubprocess\.(?:getoutput|getstatusoutput)\s*\(",
        None,
    ),
    (
        RiskyConstruct::ShellSubprocess,
        r"\bchild_process\.exec(?:Sync)?\s*\(",
        None,
    ),
    (
        RiskyConstruct::UnsafeDeserialization,
        r"\b(?:c?[Pp]ickle|marshal|dill)\.loads?\s*\(",
        None,
    ),
    (
        RiskyConstruct::UnsafeDeserialization,
        r"\byaml\.load\s*\(",
        Some("SafeLoader"),
    ),
    (
        RiskyConstruct::UnsafeDeserialization,
        r"(?:^|[^.\w])unserialize\s*\(",
        None,
    ),
];

struct Rule {
    construct: RiskyConstruct,
    pattern: Regex,
    exempt: Option<&'static str>,
}

/// Line-oriented regex scan for known-risky constructs.
///
/// Unreadable files are skipped; a hit in one file never stops the scan of the rest.
pub struct PatternScanner {
    root: PathBuf,
    rules: Vec<Rule>,
}

impl PatternScanner {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, regex::Error> {
        let rules = RULES
            .iter()
            .map(|(construct, pattern, exempt)| {
                Ok(Rule {
                    construct: *construct,
                    pattern: Regex::new(pattern)?,
                    exempt: *exempt,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self {
            root: root.into(),
            rules,
        })
    }

    pub fn scan_text(&self, file: &str, content: &str) -> Vec<SecurityFinding> {
        let mut findings = Vec::new();
        let mut seen: HashSet<(usize, RiskyConstruct)> = HashSet::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') || trimmed.starts_with("//") {
                continue;
            }
            for rule in &self.rules {
                if !rule.pattern.is_match(line) {
                    continue;
                }
                if rule.exempt.is_some_and(|ex| line.contains(ex)) {
                    continue;
                }
                if seen.insert((idx, rule.construct)) {
                    findings.push(SecurityFinding {
                        file: file.to_string(),
                        line: idx + 1,
                        construct: rule.construct,
                        snippet: snippet(trimmed),
                    });
                }
            }
        }

        findings
    }
}

fn snippet(line: &str) -> String {
    let line = line.trim_end();
    if line.chars().count() <= SNIPPET_LIMIT {
        return line.to_string();
    }
    let mut out: String = line.chars().take(SNIPPET_LIMIT).collect();
    out.push_str("...");
    out
}

/// Render findings as one diagnostic payload, one line per file/construct pair.
pub fn format_findings(findings: &[SecurityFinding]) -> String {
    findings
        .iter()
        .map(|f| {
            format!(
                "{}:{}: {} (`{}`)",
                f.file,
                f.line,
                f.construct.describe(),
                f.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl SecurityScanner for PatternScanner {
    fn name(&self) -> &str {
        "pattern"
    }

    async fn scan(&self, files: &[String]) -> anyhow::Result<Vec<SecurityFinding>> {
        let mut findings = Vec::new();
        for file in files {
            let path = self.root.join(file);
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::debug!(
                        target: "genius.validate",
                        file = %file,
                        error = %e,
                        "security scan skipped unreadable file"
                    );
                    continue;
                }
            };
            findings.extend(self.scan_text(file, &content));
        }
        Ok(findings)
    }
}
