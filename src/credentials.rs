//! API key resolution: `--api-key`, then the provider's environment variable,
//! then `~/.env`. Variables already present in the environment always win over
//! the file.

use std::{fs, sync::OnceLock};

use tracing::debug;

use crate::{cli::LlmProvider, paths::home_env_path};

static HOME_ENV_ONCE: OnceLock<()> = OnceLock::new();

/// Returns the first non-blank key, or `None` when the provider is unconfigured.
pub fn resolve_api_key(cli_value: Option<String>, provider: LlmProvider) -> Option<String> {
    if let Some(key) = non_blank(cli_value) {
        return Some(key);
    }
    ensure_home_env_loaded();
    non_blank(std::env::var(provider.env_var()).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|candidate| candidate.trim().to_string())
        .filter(|candidate| !candidate.is_empty())
}

fn ensure_home_env_loaded() {
    HOME_ENV_ONCE.get_or_init(|| {
        let Some(path) = home_env_path() else {
            return;
        };
        if let Ok(contents) = fs::read_to_string(&path) {
            let applied = apply_env_contents(&contents);
            debug!(path = %path.display(), applied, "loaded home env file");
        }
    });
}

/// Sets every assignment whose key is not yet in the environment. Returns how
/// many were applied.
fn apply_env_contents(contents: &str) -> usize {
    let mut applied = 0;
    for (key, value) in contents.lines().filter_map(parse_env_assignment) {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        // Runs once, before the server spawns request handlers.
        unsafe {
            std::env::set_var(&key, &value);
        }
        applied += 1;
    }
    applied
}

fn parse_env_assignment(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let line = line.strip_prefix("export ").map_or(line, str::trim_start);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    Some((key.to_string(), unquote(value.trim()).to_string()))
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
