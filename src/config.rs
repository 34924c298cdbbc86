//! Configuration and history-root resolution.
//!
//! History only explains rebuilds if it survives between invocations in the
//! same workspace. Rather than requiring `--history-root` on every run, the
//! root is resolved through a chain:
//!
//! 1. `--history-root <dir>` — explicit per-command override
//! 2. `HINDSIGHT_HISTORY_ROOT` env var — process/session level
//! 3. `~/.hindsight/config.toml` — global default
//! 4. `.hindsight/history` under the current directory — the workspace default

use std::{env, fs, io};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Default history location: workspace-local, persistent across builds.
const DEFAULT_HISTORY_ROOT: &str = ".hindsight/history";

/// User configuration. All keys optional; a missing file means defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Where action history is kept, when not overridden per invocation.
    pub history_root: Option<PathBuf>,
}

impl Config {
    /// Load config from `~/.hindsight/config.toml`.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.hindsight/config.toml`.
    #[must_use]
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".hindsight").join("config.toml"))
    }
}

/// Resolve the history root from the tiered resolution chain.
#[must_use]
pub fn resolve_history_root(explicit: Option<&Path>, config: &Config) -> PathBuf {
    // 1. Explicit --history-root flag.
    if let Some(root) = explicit {
        return root.to_path_buf();
    }

    // 2. HINDSIGHT_HISTORY_ROOT environment variable.
    if let Ok(root) = env::var("HINDSIGHT_HISTORY_ROOT")
        && !root.is_empty()
    {
        return PathBuf::from(root);
    }

    // 3. Config file.
    if let Some(root) = &config.history_root {
        return root.clone();
    }

    // 4. Workspace default.
    PathBuf::from(DEFAULT_HISTORY_ROOT)
}
