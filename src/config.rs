use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

/// File name looked up next to the running executable.
pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_DWELL_SECS: u64 = 10;
const DEFAULT_UPDATE_POLL_SECS: u64 = 2;

/// Configuration loaded from `config.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the watched folder tree.
    pub folder: PathBuf,
    /// Seconds a summary stays on the status label before it reverts to idle.
    #[serde(default = "default_dwell_secs")]
    pub dwell_secs: u64,
    /// Seconds between two checks of the executable's modification time.
    #[serde(default = "default_update_poll_secs")]
    pub update_poll_secs: u64,
    /// Namespace prefix prepended to the `type` and `summary` attribute names.
    #[serde(default = "default_attribute_prefix")]
    pub attribute_prefix: String,
    /// Optional file mirroring the current status label, for external status bars.
    #[serde(default)]
    pub label_file: Option<PathBuf>,
}

fn default_dwell_secs() -> u64 {
    DEFAULT_DWELL_SECS
}

fn default_update_poll_secs() -> u64 {
    DEFAULT_UPDATE_POLL_SECS
}

fn default_attribute_prefix() -> String {
    // Linux only lets unprivileged processes use the `user.` namespace.
    if cfg!(target_os = "linux") {
        "user.".to_string()
    } else {
        String::new()
    }
}

impl Config {
    /// `config.json` in the directory holding `exe`.
    pub fn default_path(exe: &Path) -> PathBuf {
        exe.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(CONFIG_FILE_NAME)
    }

    /// Load and validate the configuration at `path`.
    ///
    /// Every failure is fatal to startup: a missing or unreadable file, malformed JSON,
    /// an empty `folder`, a folder that is not an existing directory, or a zero interval.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if config.folder.as_os_str().is_empty() {
            bail!("{}: `folder` must not be empty", path.display());
        }
        if config.folder.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.folder = base.join(&config.folder);
        }
        if !config.folder.is_dir() {
            bail!(
                "{}: folder {} is not an existing directory",
                path.display(),
                config.folder.display()
            );
        }
        if config.dwell_secs == 0 {
            bail!("{}: `dwell_secs` must be greater than zero", path.display());
        }
        if config.update_poll_secs == 0 {
            bail!("{}: `update_poll_secs` must be greater than zero", path.display());
        }

        Ok(config)
    }

    pub fn dwell(&self) -> Duration {
        Duration::from_secs(self.dwell_secs)
    }

    pub fn update_poll(&self) -> Duration {
        Duration::from_secs(self.update_poll_secs)
    }
}
