//! Configuration file handling.
//!
//! Reads `mastodon-to-markdown.toml`. Command-line flags and environment
//! variables are layered on top by the CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::order::SortOrder;

pub const DEFAULT_CONFIG_FILE: &str = "mastodon-to-markdown.toml";

/// Commented starter config written by `init`.
pub const DEFAULT_CONFIG: &str = r#"# Configuration file for mastodon-to-markdown

[mastodon]
# Your Mastodon instance URL (required)
server = "https://mastodon.social"

# Access token for authentication
# Generate at: Settings > Development > New Application
# Required scope: read:statuses (add read:favourites for --include-favourites)
# Can also be supplied through MASTODON_ACCESS_TOKEN.
access_token = ""

[output]
# Template used for output. Leave empty to use the built-in default template,
# or set to a file name such as "mastodon-to-markdown.md".
template = ""

# "asc" (oldest first) or "desc" (newest first)
sort_order = "asc"

# Group posts into per-day sections of own, boosted and favourited posts.
group_by_day = false

# Also fetch posts you favourited inside the time window.
include_favourites = false

[logging]
verbose = false
debug = false
json = false
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MastodonConfig {
    pub server: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of a custom template; empty selects the embedded default.
    pub template: String,
    pub sort_order: SortOrder,
    pub group_by_day: bool,
    pub include_favourites: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub verbose: bool,
    pub debug: bool,
    pub json: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mastodon: MastodonConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load a config file.
    ///
    /// With `required` unset a missing file yields the defaults, which is how
    /// the implicit `./mastodon-to-markdown.toml` is treated.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file named by `--config`, or the optional default file in
    /// the working directory when none was named.
    pub fn discover(explicit: Option<&Path>) -> crate::Result<Self> {
        let config = match explicit {
            Some(path) => Self::load(path, true)?,
            None => Self::load(Path::new(DEFAULT_CONFIG_FILE), false)?,
        };
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
