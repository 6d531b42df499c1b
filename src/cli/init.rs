//! `hookgate init` — write a starter `.hookgate.yaml`.
//!
//! The template spells out every setting with its default value, so the
//! generated file behaves exactly like having no file at all until edited.

use crate::policy::defaults;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Where `init` wrote the file, or why it didn't.
#[derive(Debug, PartialEq, Eq)]
pub enum InitOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

/// Write the default config to `path` unless something is already there.
pub fn write_default_config(path: &Path, force: bool) -> Result<InitOutcome> {
    if path.exists() && !force {
        return Ok(InitOutcome::AlreadyExists(path.to_path_buf()));
    }
    std::fs::write(path, defaults::DEFAULT_CONFIG_YAML)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;
    Ok(InitOutcome::Created(path.to_path_buf()))
}

/// Run the `hookgate init` command.
pub fn run_init(output_path: Option<&Path>, force: bool) -> Result<()> {
    let output_file = match output_path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir()
            .context("Failed to get current directory")?
            .join(defaults::CONFIG_FILE_NAME),
    };

    match write_default_config(&output_file, force)? {
        InitOutcome::AlreadyExists(path) => {
            println!(
                "{} A config file already exists at {}",
                "⚠".yellow(),
                path.display()
            );
            println!("  Use --force to overwrite it, or edit it directly.");
        }
        InitOutcome::Created(path) => {
            println!();
            println!(
                "  {} Created {}",
                "✓".green().bold(),
                path.display().to_string().bold()
            );
            println!();
            println!("  {} With these settings hookgate will:", "ℹ".blue());
            println!("    • Block git push to main/master");
            println!("    • Block git commit while main/master is checked out");
            println!("    • Attach a pre-merge checklist to `gh pr merge`");
            println!("    • Hold unreviewed implementation tasks open (agent teams only)");
            println!();
            println!("  {} Next steps:", "→".blue());
            println!(
                "    1. Validate it: {}",
                format!("hookgate check {}", path.display()).dimmed()
            );
            println!("    2. Install the hooks: {}", "hookgate setup".dimmed());
            println!();
        }
    }

    Ok(())
}
