//! Command gate — checks a Bash command before the agent runs it.
//!
//! Rules are evaluated **in order** and the first one that produces a
//! decision wins:
//!
//! 1. `protected-push`: `git push ... main|master` is blocked outright. Pure
//!    text match, no git query, since the risk does not depend on local HEAD.
//! 2. `protected-commit`: a `git commit` at a statement boundary is blocked
//!    when the work tree it targets has a protected branch checked out.
//!    Boundaries are found after quoted strings and heredoc bodies have been
//!    masked out, so text the command only writes never counts.
//! 3. `merge-advisory`: `gh pr merge` is allowed with a pre-merge checklist.
//!
//! Anything else is allowed silently.

use crate::git::{resolve_worktree, BranchLookup};
use crate::policy::config::GateConfig;
use crate::policy::defaults;
use crate::policy::types::Decision;
use crate::utils::patterns::literal_alternation;
use crate::utils::shell::mask_literals;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Path, PathBuf};

pub const RULE_PROTECTED_PUSH: &str = "protected-push";
pub const RULE_PROTECTED_COMMIT: &str = "protected-commit";
pub const RULE_MERGE_ADVISORY: &str = "merge-advisory";

/// `git commit` at the start of the command or right after `&&`, `;` or `|`.
/// No multi-line flag: `^` is start of text, and only blanks may follow the
/// operator, so a separator at the end of a line never anchors the next one.
const COMMIT_AT_BOUNDARY: &str = r#"(?:^|&&|;|\|)[ \t]*git\s+(?:-C\s+(?:"(?P<dq>[^"]+)"|'(?P<sq>[^']+)'|(?P<bare>\S+))\s+)?commit"#;

const PR_MERGE: &str = r"gh\s+pr\s+merge";

/// What a rule looks for, and the compiled pattern it uses.
enum Check {
    ProtectedPush(Regex),
    ProtectedCommit(Regex),
    MergeAdvisory(Regex),
}

/// One `(predicate, outcome)` entry in the gate's ordered rule list.
struct CommandRule {
    name: &'static str,
    check: Check,
}

/// Everything a rule may look at for one command.
struct CommandContext<'a> {
    command: &'a str,
    cwd: Option<&'a Path>,
    branches: &'a dyn BranchLookup,
}

/// Pre-compiled command gate, built once per invocation from the config.
pub struct CommandGate {
    rules: Vec<CommandRule>,
    protected_branches: Vec<String>,
}

impl CommandGate {
    /// Build the ordered rule list for a config. The built-in protected
    /// branches are always part of it; config can only add to them.
    pub fn new(config: &GateConfig) -> Result<Self> {
        let protected_branches = config.protected_branches();

        let push = Regex::new(&format!(
            r"(?i)git\s+push\s+.*\b({})(\s|$)",
            literal_alternation(&protected_branches)
        ))
        .context("Failed to compile protected-push pattern")?;
        let commit =
            Regex::new(COMMIT_AT_BOUNDARY).context("Failed to compile protected-commit pattern")?;
        let merge = Regex::new(PR_MERGE).context("Failed to compile merge pattern")?;

        Ok(Self {
            rules: vec![
                CommandRule {
                    name: RULE_PROTECTED_PUSH,
                    check: Check::ProtectedPush(push),
                },
                CommandRule {
                    name: RULE_PROTECTED_COMMIT,
                    check: Check::ProtectedCommit(commit),
                },
                CommandRule {
                    name: RULE_MERGE_ADVISORY,
                    check: Check::MergeAdvisory(merge),
                },
            ],
            protected_branches,
        })
    }

    /// Evaluate one command string.
    ///
    /// `cwd` is the host-reported working directory, used as the default
    /// work tree and as the base for relative `git -C` paths.
    pub fn evaluate(
        &self,
        command: &str,
        cwd: Option<&Path>,
        branches: &dyn BranchLookup,
    ) -> Decision {
        let ctx = CommandContext {
            command,
            cwd,
            branches,
        };

        for rule in &self.rules {
            if let Some(decision) = self.apply(rule, &ctx) {
                tracing::debug!(rule = rule.name, %decision, "command rule matched");
                return decision;
            }
        }

        Decision::allow()
    }

    /// Names of the active rules, in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// `-C` paths of every boundary-anchored `git commit` in the command,
    /// in order. `None` entries are commits without a `-C` redirection.
    /// Empty when the command has no such commit.
    pub fn commit_targets(&self, command: &str) -> Vec<Option<String>> {
        self.rules
            .iter()
            .find_map(|rule| match &rule.check {
                Check::ProtectedCommit(re) => Some(commit_targets(re, command)),
                _ => None,
            })
            .unwrap_or_default()
    }

    fn apply(&self, rule: &CommandRule, ctx: &CommandContext<'_>) -> Option<Decision> {
        match &rule.check {
            Check::ProtectedPush(re) => re
                .is_match(ctx.command)
                .then(|| Decision::deny(rule.name, self.push_message(ctx.command))),

            Check::ProtectedCommit(re) => {
                let mut checked: Vec<Option<PathBuf>> = Vec::new();
                for target in commit_targets(re, ctx.command) {
                    let dir = resolve_worktree(target.as_deref(), ctx.cwd);
                    if checked.contains(&dir) {
                        continue;
                    }
                    let branch = ctx.branches.current_branch(dir.as_deref());
                    checked.push(dir);

                    if let Some(branch) = branch {
                        if self.is_protected(&branch) {
                            return Some(Decision::deny(rule.name, commit_message(&branch)));
                        }
                    }
                }
                None
            }

            Check::MergeAdvisory(re) => re
                .is_match(ctx.command)
                .then(|| Decision::advise(rule.name, defaults::MERGE_CHECKLIST)),
        }
    }

    fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.iter().any(|b| b == branch)
    }

    fn push_message(&self, command: &str) -> String {
        format!(
            "BLOCKED: Direct push to {}. Use PR workflow.\nCommand: {}",
            self.protected_branches.join("/"),
            command
        )
    }
}

/// Match against the masked command; `-C` paths are read back from the
/// original, which has the same byte offsets.
fn commit_targets(re: &Regex, command: &str) -> Vec<Option<String>> {
    let masked = mask_literals(command);
    re.captures_iter(&masked)
        .map(|caps| {
            caps.name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .and_then(|m| command.get(m.range()))
                .map(str::to_string)
        })
        .collect()
}

fn commit_message(branch: &str) -> String {
    format!(
        "BLOCKED: Cannot commit directly to the protected branch '{}'\n\
         \n\
         Create a feature branch first:\n  \
         git checkout -b feature/your-feature-name\n\
         \n\
         Or use /feature-start if available",
        branch
    )
}
