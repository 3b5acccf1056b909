//! Configuration loading.
//!
//! The default configuration file is `scriptcheck.toml` in the current
//! working directory. Every field has a default, so the file can be omitted
//! entirely. Command-line flags override the values read here.
//!
//! ```toml
//! shell = "bash"
//! pipeline = "gitlab"
//! merge = false
//! strict = true
//!
//! [shellcheck]
//! args = ["severity=warning", "exclude=SC1091"]
//! ```

use std::path::Path;

use crate::error::{Error, Result};
use crate::reader::PipelineType;

/// Name of the configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scriptcheck.toml";

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Shell assumed for scripts without a directive. Empty lets shellcheck
    /// decide.
    pub shell: String,
    /// Pipeline dialect of the input files.
    pub pipeline: PipelineType,
    /// Merge all input files into one pipeline before extraction, so
    /// anchors and references may cross files.
    pub merge: bool,
    /// Fail when no script is found.
    pub strict: bool,
    pub shellcheck: ShellcheckConfig,
}

/// Options passed through to shellcheck.
#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct ShellcheckConfig {
    /// Extra flags, with or without their leading `--`
    /// (`severity=warning` and `--severity=warning` are equivalent).
    pub args: Vec<String>,
}

impl Config {
    /// Loads configuration from a TOML file.
    ///
    /// Resolution order:
    /// 1. If `path` is `Some`, load from that file (error if missing).
    /// 2. Otherwise try `scriptcheck.toml` in the current directory.
    /// 3. If that file does not exist either, return [`Config::default()`].
    ///
    /// # Errors
    ///
    /// [`Error::Config`] when the explicit path does not exist, or the file
    /// cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let config_path = match path {
            Some(p) if p.exists() => Some(p.to_path_buf()),
            Some(p) => {
                return Err(Error::Config(format!(
                    "config file not found: {}",
                    p.display()
                )))
            }
            None => Some(Path::new(DEFAULT_CONFIG_FILE).to_path_buf()).filter(|p| p.exists()),
        };

        match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::Config(format!("failed to read {}: {e}", path.display()))
                })?;
                Config::from_toml(&content).map_err(|e| match e {
                    Error::Config(message) => {
                        Error::Config(format!("{}: {message}", path.display()))
                    }
                    other => other,
                })
            }
            None => Ok(Config::default()),
        }
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Config> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}
