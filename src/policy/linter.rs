//! Config linter — spots settings that quietly weaken the gates.
//!
//! `hookgate check` runs this after the config parses. Nothing here is an
//! error; the config works, it just may not do what its author expects.

use crate::policy::config::GateConfig;
use crate::policy::defaults;
use crate::utils::patterns::PatternSet;
use colored::Colorize;

/// Subjects that should always be gated. An exemption pattern that matches
/// one of these lets ordinary implementation work skip review.
const IMPLEMENTATION_SAMPLES: &[&str] = &[
    "implement retry logic",
    "add unit tests",
    "fix the parser bug",
    "task 2.1: build exporter",
];

/// Text that mentions review without showing it happened.
const UNREVIEWED_SAMPLES: &[&str] = &["needs review", "fix the review comments"];

const SLOW_TIMEOUT_MS: u64 = 10_000;

/// A lint warning — something the user should know about their config.
#[derive(Debug)]
pub struct LintWarning {
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Severity {
    /// Something that weakens a gate
    Warning,
    /// Worth knowing, probably intended
    Info,
}

impl LintWarning {
    fn warn(msg: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: msg.into(),
            suggestion: None,
        }
    }

    fn warn_with_fix(msg: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: msg.into(),
            suggestion: Some(fix.into()),
        }
    }

    fn info(msg: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: msg.into(),
            suggestion: None,
        }
    }

    fn info_with_fix(msg: impl Into<String>, fix: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: msg.into(),
            suggestion: Some(fix.into()),
        }
    }

    /// Format for terminal output.
    pub fn display(&self) -> String {
        let icon = match self.severity {
            Severity::Warning => "⚠".yellow().to_string(),
            Severity::Info => "ℹ".blue().to_string(),
        };
        let mut out = format!("  {} {}", icon, self.message);
        if let Some(ref suggestion) = self.suggestion {
            out.push_str(&format!("\n    {}: {}", "Fix".green(), suggestion));
        }
        out
    }
}

/// Lint a config. `task_gate_active` is whether the activation variable is
/// set in the environment the check runs in.
pub fn lint_config(config: &GateConfig, task_gate_active: bool) -> Vec<LintWarning> {
    let mut warnings = Vec::new();

    check_extra_branches(config, &mut warnings);
    check_timeout(config, &mut warnings);
    check_task_activation(task_gate_active, &mut warnings);
    check_exempt_patterns(config, &mut warnings);
    check_reviewed_patterns(config, &mut warnings);

    warnings
}

fn check_extra_branches(config: &GateConfig, warnings: &mut Vec<LintWarning>) {
    for branch in &config.extra_protected_branches {
        if defaults::PROTECTED_BRANCHES.contains(&branch.as_str()) {
            warnings.push(LintWarning::info(format!(
                "'{}' is always protected; listing it in extra_protected_branches has no effect",
                branch
            )));
        }
    }
}

fn check_timeout(config: &GateConfig, warnings: &mut Vec<LintWarning>) {
    let ms = config.branch_query_timeout_ms;
    if ms > SLOW_TIMEOUT_MS {
        warnings.push(LintWarning::warn_with_fix(
            format!(
                "branch_query_timeout_ms is {} — every git commit may stall that long if git hangs",
                ms
            ),
            "Use a few seconds, e.g. branch_query_timeout_ms: 5000",
        ));
    }
}

fn check_task_activation(active: bool, warnings: &mut Vec<LintWarning>) {
    if !active {
        warnings.push(LintWarning::info_with_fix(
            format!(
                "Task gate is inactive here — {} is not set",
                defaults::TASK_GATE_ACTIVATION_ENV
            ),
            format!("export {}=1", defaults::TASK_GATE_ACTIVATION_ENV),
        ));
    }
}

fn check_exempt_patterns(config: &GateConfig, warnings: &mut Vec<LintWarning>) {
    for pattern in &config.task_gate.extra_exempt_patterns {
        let Ok(set) = PatternSet::new(std::slice::from_ref(pattern)) else {
            continue;
        };
        if let Some(sample) = IMPLEMENTATION_SAMPLES.iter().find(|s| set.is_match(s)) {
            warnings.push(LintWarning::warn(format!(
                "Exemption pattern '{}' matches \"{}\" — implementation tasks like this would skip review",
                pattern, sample
            )));
        }
    }
}

fn check_reviewed_patterns(config: &GateConfig, warnings: &mut Vec<LintWarning>) {
    for pattern in &config.task_gate.extra_reviewed_patterns {
        let Ok(set) = PatternSet::new(std::slice::from_ref(pattern)) else {
            continue;
        };
        if let Some(sample) = UNREVIEWED_SAMPLES.iter().find(|s| set.is_match(s)) {
            warnings.push(LintWarning::warn(format!(
                "Reviewed pattern '{}' matches \"{}\" — tasks that only mention review would pass",
                pattern, sample
            )));
        }
    }
}
