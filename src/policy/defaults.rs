//! Built-in vocabularies and the default config template.
//!
//! The pattern lists here are the gates' policy. Order matters only for
//! reporting which pattern matched; classification is "any match".

/// Branches that must not receive direct pushes or commits. Always
/// protected; config can only add more.
pub const PROTECTED_BRANCHES: &[&str] = &["main", "master"];

/// Upper bound on the `git rev-parse` branch query.
pub const BRANCH_QUERY_TIMEOUT_MS: u64 = 5_000;

/// Smallest timeout a config may set.
pub const MIN_BRANCH_QUERY_TIMEOUT_MS: u64 = 500;

/// Environment variable that switches the task gate on.
pub const TASK_GATE_ACTIVATION_ENV: &str = "CLAUDE_CODE_EXPERIMENTAL_AGENT_TEAMS";

/// Config file name, discovered by walking up from the working directory.
pub const CONFIG_FILE_NAME: &str = ".hookgate.yaml";

/// Hook event names, used when the event omits `hook_event_name`.
pub const PRE_TOOL_USE_EVENT: &str = "PreToolUse";
pub const TASK_COMPLETED_EVENT: &str = "TaskCompleted";

/// Matched against the whole lowercased task text.
pub const IMPLEMENTATION_PATTERNS: &[&str] = &[
    r"\b(implement|create|add|build|write|update|refactor|fix|migrate)\b",
    r"\btask\s+\d+\.\d+\b",
];

/// Review/meta tasks, matched against the lowercased subject only.
/// Narrow on purpose: words like "check" or "verify" stay gated.
pub const EXEMPTION_PATTERNS: &[&str] = &[
    r"^review\b",
    r"\breview\s+(this|the|task|code|changes|implementation)\b",
    r"\bready\s+for\s+review\b",
    r"^(meta|setup|cleanup|housekeeping)\b",
    r"\b(spec|quality|staff)\s+review\b",
];

/// Evidence that review already happened, matched against the whole text.
pub const REVIEWED_PATTERNS: &[&str] = &[
    r"\breviewed\b",
    r"\bapproved\b",
    r"\bpass\b",
    r"\breview\s+passed\b",
];

/// Shown to the agent before any `gh pr merge`.
pub const MERGE_CHECKLIST: &str = "WARNING: You are merging a PR. Did you complete the checklist?\n\
1) Wait for CI to pass\n\
2) Wait 10-12 seconds for delayed review comments\n\
3) Fetch and review all comments\n\
4) Address any blockers (CRITICAL, FIX, BLOCKER)\n\
Consider using /pr-merge command instead for safe merging.";

/// Stderr text for an unreviewed implementation task.
pub const TASK_REVIEW_REQUIRED: &str = "Task requires review before completion. \
Reviewer: please review this task before marking it complete.";

/// Template written by `hookgate init`. Mirrors the built-in defaults.
pub const DEFAULT_CONFIG_YAML: &str = r#"# hookgate configuration
# Every key is optional; missing keys fall back to the values shown here.
# main and master are always protected and the pre-merge checklist is always
# shown. The task gate runs when CLAUDE_CODE_EXPERIMENTAL_AGENT_TEAMS is set.

# More branches that must never receive a direct push or commit.
# extra_protected_branches: [release]

# How long to wait for `git rev-parse` when checking the current branch
# (at least 500). If git is slower, the commit check lets the command through.
branch_query_timeout_ms: 5000

task_gate:
  # Extra regexes (lowercase text) for tasks that never need review.
  # Matched against the task subject.
  extra_exempt_patterns: []

  # Extra regexes (lowercase text) that count as proof of review.
  # Matched against subject + description.
  extra_reviewed_patterns: []
"#;
