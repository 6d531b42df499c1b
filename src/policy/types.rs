//! Core types shared by both gates.
//!
//! A gate turns one hook event into exactly one `Decision`. The decision
//! carries everything the hook runner needs to honor the exit-status contract:
//! the stderr explanation for a block, or the advisory text for a warning.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Exit status for an action that may proceed (with or without advisory).
pub const EXIT_ALLOW: i32 = 0;

/// Exit status for a blocked action. The host reads stderr as the rationale.
pub const EXIT_BLOCK: i32 = 2;

/// The result of running an event through a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Action is permitted.
    Allowed {
        /// Which rule allowed it (None = nothing matched)
        #[serde(skip_serializing_if = "Option::is_none")]
        matched_rule: Option<String>,
    },
    /// Action is blocked. `reason` is written to stderr, one line per line.
    Denied {
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        matched_rule: Option<String>,
    },
    /// Action is permitted, but the agent gets extra context first.
    Advised {
        context: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        matched_rule: Option<String>,
    },
}

impl Decision {
    /// Plain allow, no rule involved.
    pub fn allow() -> Self {
        Decision::Allowed { matched_rule: None }
    }

    pub fn allow_by(rule: &str) -> Self {
        Decision::Allowed {
            matched_rule: Some(rule.to_string()),
        }
    }

    pub fn deny(rule: &str, reason: impl Into<String>) -> Self {
        Decision::Denied {
            reason: reason.into(),
            matched_rule: Some(rule.to_string()),
        }
    }

    pub fn advise(rule: &str, context: impl Into<String>) -> Self {
        Decision::Advised {
            context: context.into(),
            matched_rule: Some(rule.to_string()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Decision::Denied { .. })
    }

    pub fn is_advised(&self) -> bool {
        matches!(self, Decision::Advised { .. })
    }

    /// Name of the rule that produced this decision, if any.
    pub fn matched_rule(&self) -> Option<&str> {
        match self {
            Decision::Allowed { matched_rule }
            | Decision::Denied { matched_rule, .. }
            | Decision::Advised { matched_rule, .. } => matched_rule.as_deref(),
        }
    }

    /// Process exit status that encodes this decision for the host.
    pub fn exit_code(&self) -> i32 {
        match self {
            Decision::Denied { .. } => EXIT_BLOCK,
            Decision::Allowed { .. } | Decision::Advised { .. } => EXIT_ALLOW,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allowed { .. } => write!(f, "allowed"),
            Decision::Denied { reason, .. } => {
                let first = reason.lines().next().unwrap_or_default();
                write!(f, "denied: {}", first)
            }
            Decision::Advised { .. } => write!(f, "allowed with advisory"),
        }
    }
}
