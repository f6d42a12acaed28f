//! Initialize a new gmix project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing gmix project...", "→".blue());

    std::fs::create_dir_all(&base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    if write_default_config(&base_path)? {
        println!("  {} Created {}", "✓".green(), base_path.join(CONFIG_FILE).display());
    } else {
        println!(
            "  {} {} already exists",
            "•".yellow(),
            base_path.join(CONFIG_FILE).display()
        );
    }

    println!();
    println!("{} gmix project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} edit the [model] section of {}", "1.".blue(), CONFIG_FILE);
    println!("  {} gmix fit <observations.jsonl>", "2.".blue());

    Ok(())
}

/// Write a default config into `dir` unless one is already there.
fn write_default_config(dir: &Path) -> Result<bool> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Ok(false);
    }
    Config::default().save(&config_path)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn does_not_overwrite_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(write_default_config(dir.path()).unwrap());

        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "[model]\nmax_clusters = 3\n").unwrap();
        assert!(!write_default_config(dir.path()).unwrap());

        let kept = std::fs::read_to_string(&path).unwrap();
        assert!(kept.contains("max_clusters = 3"));
    }
}
