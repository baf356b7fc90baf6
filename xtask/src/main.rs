use std::fs;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Workspace maintenance tasks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run layering guardrails.
    CheckArchitecture,
}

/// Directory, forbidden needles. Test modules are exempt.
const LAYER_RULES: &[(&str, &[&str])] = &[
    (
        "src/core",
        &[
            "crate::adapters",
            "crate::application",
            "axum::",
            "reqwest::",
            "rig::",
            "handlebars::",
        ],
    ),
    (
        "src/application",
        &["crate::adapters", "axum::", "reqwest::", "rig::"],
    ),
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::CheckArchitecture => check_architecture(),
    }
}

fn check_architecture() -> Result<()> {
    let mut failures = Vec::new();
    for (dir, needles) in LAYER_RULES {
        for needle in *needles {
            if let Err(err) = ensure_no_pattern(dir, needle) {
                failures.push(err.to_string());
            }
        }
    }
    if failures.is_empty() {
        println!("architecture checks passed");
        Ok(())
    } else {
        Err(anyhow!(failures.join("\n")))
    }
}

fn ensure_no_pattern(dir: &str, needle: &str) -> Result<()> {
    let mut offenders = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                offenders.push(format!("{dir} (walk error: {e})"));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("rs") {
            continue;
        }
        let content = fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read {}", entry.path().display()))?;
        if production_section(&content).contains(needle) {
            offenders.push(entry.path().display().to_string());
        }
    }

    if offenders.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "Forbidden reference to '{needle}' found in: {}",
            offenders.join(", ")
        ))
    }
}

/// Test modules sit at the bottom of each file.
fn production_section(content: &str) -> &str {
    content
        .find("#[cfg(test)]")
        .map_or(content, |idx| &content[..idx])
}
