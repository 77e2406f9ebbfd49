//! User configuration: a TOML file plus a few environment overrides.
//!
//! The config is loaded once by the binary and handed to the generator and
//! editor by value. Nothing below the CLI layer reads it from global state.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::llm::Provider;

/// Default timeout for a single provider call (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV_VAR: &str = "CLUECOMMIT_CONFIG";

/// Environment variable to override the provider timeout.
pub const TIMEOUT_ENV_VAR: &str = "CLUECOMMIT_TIMEOUT";

/// Environment variable to override the stored API key.
pub const API_KEY_ENV_VAR: &str = "CLUECOMMIT_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmSettings,
    pub editor: EditorSettings,
}

/// Settings handed to the message generator at construction time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: Provider,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Whether deleted file names are sent to the model alongside the diff.
    pub include_deleted_files: bool,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Claude,
            model: None,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            include_deleted_files: true,
        }
    }
}

impl LlmSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Editor command line, e.g. `nvim` or `code --wait`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Config {
    /// Resolve the config file location.
    ///
    /// `$CLUECOMMIT_CONFIG` wins; otherwise `<config dir>/cluecommit/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        dirs::config_dir()
            .map(|dir| dir.join("cluecommit").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the config from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::ReadFailed {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Write the config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, content).map_err(|source| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `CLUECOMMIT_TIMEOUT` and `CLUECOMMIT_API_KEY`.
    ///
    /// An invalid timeout value is logged and ignored.
    pub fn apply_env_overrides(&mut self) {
        match env::var(TIMEOUT_ENV_VAR) {
            Ok(v) if !v.is_empty() => match v.parse::<u64>() {
                Ok(secs) => self.llm.timeout_secs = secs,
                Err(_) => warn!(
                    "Invalid {} value '{}', using {}s",
                    TIMEOUT_ENV_VAR, v, self.llm.timeout_secs
                ),
            },
            _ => {}
        }

        if let Ok(key) = env::var(API_KEY_ENV_VAR)
            && !key.is_empty()
        {
            self.llm.api_key = Some(key);
        }
    }

    /// Render the config for display with the API key masked.
    pub fn display_masked(&self) -> String {
        let mut shown = self.clone();
        shown.llm.api_key = shown.llm.api_key.as_deref().map(mask_key);
        toml::to_string_pretty(&shown).unwrap_or_default()
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if key.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("****{visible}")
    }
}
