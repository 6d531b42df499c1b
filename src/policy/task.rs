//! Task gate — keeps implementation tasks from being closed before review.
//!
//! The text checked is `subject + " " + description`, lowercased. Rules run
//! in order and the first match allows the completion:
//!
//! 1. `review-exempt`: the *subject* reads as a review or housekeeping task.
//! 2. `not-implementation`: nothing in the text looks like implementation work.
//! 3. `already-reviewed`: the text carries evidence that review happened.
//!
//! A task that gets past all three is an unreviewed implementation task and
//! is blocked. Exemption is checked against the subject alone so that an
//! implementation task whose description mentions review is still gated.

use crate::policy::config::TaskGateSettings;
use crate::policy::defaults;
use crate::policy::types::Decision;
use crate::utils::patterns::PatternSet;
use anyhow::{Context, Result};
use std::ffi::OsStr;

pub const RULE_GATE_INACTIVE: &str = "gate-inactive";
pub const RULE_EMPTY_TASK: &str = "empty-task";
pub const RULE_REVIEW_EXEMPT: &str = "review-exempt";
pub const RULE_NOT_IMPLEMENTATION: &str = "not-implementation";
pub const RULE_ALREADY_REVIEWED: &str = "already-reviewed";
pub const RULE_REVIEW_REQUIRED: &str = "review-required";

/// What part of the task a rule looks at, and how.
enum TaskTest {
    /// Allow when the lowercased subject matches.
    SubjectMatches(PatternSet),
    /// Allow when the lowercased full text does NOT match.
    TextLacks(PatternSet),
    /// Allow when the lowercased full text matches.
    TextMatches(PatternSet),
}

struct TaskRule {
    name: &'static str,
    test: TaskTest,
}

/// Lowercased views of a task, built once per evaluation.
struct TaskText {
    subject: String,
    full: String,
}

impl TaskText {
    fn new(subject: &str, description: &str) -> Self {
        Self {
            subject: subject.to_lowercase(),
            full: format!("{} {}", subject, description).to_lowercase(),
        }
    }
}

/// Pre-compiled task gate.
pub struct TaskGate {
    active: bool,
    rules: Vec<TaskRule>,
}

impl TaskGate {
    /// Build the gate. `active` is the resolved activation flag; an inactive
    /// gate allows everything.
    pub fn new(settings: &TaskGateSettings, active: bool) -> Result<Self> {
        let exempt =
            PatternSet::with_extras(defaults::EXEMPTION_PATTERNS, &settings.extra_exempt_patterns)
                .context("Failed to compile review-exemption patterns")?;
        let implementation = PatternSet::new(defaults::IMPLEMENTATION_PATTERNS)
            .context("Failed to compile implementation patterns")?;
        let reviewed = PatternSet::with_extras(
            defaults::REVIEWED_PATTERNS,
            &settings.extra_reviewed_patterns,
        )
        .context("Failed to compile reviewed-indicator patterns")?;

        Ok(Self {
            active,
            rules: vec![
                TaskRule {
                    name: RULE_REVIEW_EXEMPT,
                    test: TaskTest::SubjectMatches(exempt),
                },
                TaskRule {
                    name: RULE_NOT_IMPLEMENTATION,
                    test: TaskTest::TextLacks(implementation),
                },
                TaskRule {
                    name: RULE_ALREADY_REVIEWED,
                    test: TaskTest::TextMatches(reviewed),
                },
            ],
        })
    }

    /// Build the gate with the activation flag read from the environment.
    pub fn from_env(settings: &TaskGateSettings) -> Result<Self> {
        Self::new(settings, Self::active_in_env())
    }

    /// Whether a value of the activation variable switches the gate on:
    /// set and non-empty.
    pub fn is_activation_value(value: Option<&OsStr>) -> bool {
        value.is_some_and(|v| !v.is_empty())
    }

    /// Whether `CLAUDE_CODE_EXPERIMENTAL_AGENT_TEAMS` is set in this process.
    pub fn active_in_env() -> bool {
        Self::is_activation_value(std::env::var_os(defaults::TASK_GATE_ACTIVATION_ENV).as_deref())
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Names of the allow rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Decide whether a task with this subject and description may be
    /// marked complete.
    pub fn evaluate(&self, subject: &str, description: &str) -> Decision {
        if !self.active {
            return Decision::allow_by(RULE_GATE_INACTIVE);
        }

        if subject.trim().is_empty() && description.trim().is_empty() {
            return Decision::allow_by(RULE_EMPTY_TASK);
        }

        let text = TaskText::new(subject, description);
        for rule in &self.rules {
            if rule.allows(&text) {
                tracing::debug!(rule = rule.name, "task allowed");
                return Decision::allow_by(rule.name);
            }
        }

        tracing::debug!(subject, "implementation task has no review evidence");
        Decision::deny(RULE_REVIEW_REQUIRED, defaults::TASK_REVIEW_REQUIRED)
    }
}

impl TaskRule {
    fn allows(&self, text: &TaskText) -> bool {
        match &self.test {
            TaskTest::SubjectMatches(set) => set.is_match(&text.subject),
            TaskTest::TextLacks(set) => !set.is_match(&text.full),
            TaskTest::TextMatches(set) => set.is_match(&text.full),
        }
    }
}
