use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Settings read from the optional TOML config file.
///
/// Every key is optional; command-line flags take precedence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhonebookConfig {
    /// File opened at startup when `--file` is not given.
    pub default_file: Option<PathBuf>,
    /// Whether console output is colored.
    pub color: bool,
    /// Log level for stderr diagnostics (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: Option<String>,
}

impl Default for PhonebookConfig {
    fn default() -> Self {
        Self {
            default_file: None,
            color: true,
            log_level: None,
        }
    }
}

impl PhonebookConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// The configured log level, if any.
    pub fn level(&self) -> anyhow::Result<Option<Level>> {
        self.log_level
            .as_deref()
            .map(|raw| {
                raw.parse::<Level>()
                    .map_err(|_| anyhow::anyhow!("unknown log level {raw:?}"))
            })
            .transpose()
    }
}
