//! YAML config loader for hookgate.
//!
//! The config file is optional. Every key has a built-in default, so a
//! project only writes the keys it wants to change.
//!
//! The file lives in the repository the agent works in, so it can only add
//! to the guards: `main` and `master` stay protected, the merge advisory
//! stays on, and the task gate's activation variable is fixed. Unknown keys
//! are rejected rather than ignored.
//!
//! # Example config file:
//! ```yaml
//! extra_protected_branches: [release, develop]
//! branch_query_timeout_ms: 3000
//! task_gate:
//!   extra_reviewed_patterns: ['\blgtm\b']
//! ```

use crate::policy::defaults;
use crate::utils::patterns::PatternSet;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Raw YAML representation; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    extra_protected_branches: Option<StringOrVec>,
    #[serde(default)]
    branch_query_timeout_ms: Option<u64>,
    #[serde(default)]
    task_gate: Option<RawTaskGate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTaskGate {
    #[serde(default)]
    extra_exempt_patterns: Option<StringOrVec>,
    #[serde(default)]
    extra_reviewed_patterns: Option<StringOrVec>,
}

/// Allows YAML fields to be either a single string or a list of strings:
/// ```yaml
/// extra_protected_branches: release             # single string — works
/// extra_protected_branches: [release, develop]  # list — also works
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrVec {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrVec {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringOrVec::Single(s) => vec![s],
            StringOrVec::Multiple(v) => v,
        }
    }
}

/// Settings for both gates, after defaults are applied and values validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateConfig {
    /// Branches protected in addition to the built-in ones.
    pub extra_protected_branches: Vec<String>,
    pub branch_query_timeout_ms: u64,
    pub task_gate: TaskGateSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskGateSettings {
    pub extra_exempt_patterns: Vec<String>,
    pub extra_reviewed_patterns: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            extra_protected_branches: Vec::new(),
            branch_query_timeout_ms: defaults::BRANCH_QUERY_TIMEOUT_MS,
            task_gate: TaskGateSettings::default(),
        }
    }
}

impl GateConfig {
    pub fn branch_query_timeout(&self) -> Duration {
        Duration::from_millis(self.branch_query_timeout_ms)
    }

    /// Built-in protected branches followed by the extras, without repeats.
    pub fn protected_branches(&self) -> Vec<String> {
        let mut branches: Vec<String> = defaults::PROTECTED_BRANCHES
            .iter()
            .map(|b| b.to_string())
            .collect();
        for extra in &self.extra_protected_branches {
            if !branches.contains(extra) {
                branches.push(extra.clone());
            }
        }
        branches
    }

    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches().iter().any(|b| b == branch)
    }
}

/// A config plus the file it came from (None = built-in defaults).
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: GateConfig,
    pub source: Option<PathBuf>,
}

/// Parse a YAML config file from a file path.
pub fn parse_config_file(path: impl AsRef<Path>) -> Result<GateConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse a YAML config string into a validated `GateConfig`.
pub fn parse_config_str(yaml: &str) -> Result<GateConfig> {
    let raw: RawConfig = if is_blank_yaml(yaml) {
        RawConfig::default()
    } else {
        serde_yaml::from_str(yaml).context("Invalid YAML syntax in config file")?
    };

    let mut config = GateConfig::default();

    if let Some(branches) = raw.extra_protected_branches {
        config.extra_protected_branches = branches.into_vec();
        if config.extra_protected_branches.is_empty() {
            bail!("extra_protected_branches is empty; name a branch or remove the key");
        }
    }
    if let Some(timeout) = raw.branch_query_timeout_ms {
        config.branch_query_timeout_ms = timeout;
    }
    if let Some(task) = raw.task_gate {
        if let Some(extra) = task.extra_exempt_patterns {
            config.task_gate.extra_exempt_patterns = extra.into_vec();
        }
        if let Some(extra) = task.extra_reviewed_patterns {
            config.task_gate.extra_reviewed_patterns = extra.into_vec();
        }
    }

    validate(&config)?;
    Ok(config)
}

fn validate(config: &GateConfig) -> Result<()> {
    for (i, branch) in config.extra_protected_branches.iter().enumerate() {
        if branch.trim().is_empty() {
            bail!("extra_protected_branches[{}] is empty", i);
        }
        if branch.chars().any(char::is_whitespace) {
            bail!(
                "extra_protected_branches[{}] '{}' contains whitespace — branch names cannot",
                i,
                branch
            );
        }
    }

    // A short timeout turns every branch query into "unknown", which lets
    // commits through.
    if config.branch_query_timeout_ms < defaults::MIN_BRANCH_QUERY_TIMEOUT_MS {
        bail!(
            "branch_query_timeout_ms must be at least {}",
            defaults::MIN_BRANCH_QUERY_TIMEOUT_MS
        );
    }

    PatternSet::new(&config.task_gate.extra_exempt_patterns)
        .context("Invalid regex in task_gate.extra_exempt_patterns")?;
    PatternSet::new(&config.task_gate.extra_reviewed_patterns)
        .context("Invalid regex in task_gate.extra_reviewed_patterns")?;

    Ok(())
}

/// An empty file or one with only comments is a valid "use the defaults".
fn is_blank_yaml(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---"
    })
}

/// Find `.hookgate.yaml` walking up from the given directory.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let candidate = dir.join(defaults::CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Load the config governing `start`, or the defaults when there is none.
pub fn load_config(start: &Path) -> Result<LoadedConfig> {
    match find_config(start) {
        Some(path) => Ok(LoadedConfig {
            config: parse_config_file(&path)?,
            source: Some(path),
        }),
        None => Ok(LoadedConfig {
            config: GateConfig::default(),
            source: None,
        }),
    }
}
