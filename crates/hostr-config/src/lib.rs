//! Configuration management for hostr.
//!
//! Parses `hostr.toml` configuration files with serde and provides
//! auto-discovery of config files in the served directory and its parents.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hostr.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override default index filename.
    pub index: Option<String>,
    /// Override SPA mode flag.
    pub spa: Option<bool>,
    /// Override live reload enabled flag.
    pub live_reload_enabled: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Serving rules.
    pub serve: ServeConfig,
    /// Live reload configuration.
    pub live_reload: LiveReloadConfig,

    /// Directory being served (set after loading).
    #[serde(skip)]
    pub root: PathBuf,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            serve: ServeConfig::default(),
            live_reload: LiveReloadConfig::default(),
            root: PathBuf::from("."),
            config_path: None,
        }
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Serving rules.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// File served when a request resolves to a directory.
    pub index: String,
    /// Serve the index file for paths that match no real file.
    pub spa: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            index: "index.html".to_owned(),
            spa: false,
        }
    }
}

/// Live reload configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LiveReloadConfig {
    /// Whether live reload is enabled.
    pub enabled: bool,
}

impl Default for LiveReloadConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration for serving `dir`.
    ///
    /// Uses `explicit_path` when given, otherwise auto-discovers
    /// `hostr.toml` starting at `dir` and walking up through its parents.
    /// Falls back to defaults when no file is found. CLI settings are
    /// applied last and take precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load(
        dir: &Path,
        explicit_path: Option<&Path>,
        cli: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::discover(dir) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.root = dir.to_path_buf();

        if let Some(cli) = cli {
            config.apply_cli_settings(cli);
        }

        Ok(config)
    }

    /// Parse a config file.
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config: Self = toml::from_str(&raw)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Find `hostr.toml` in `dir` or the nearest ancestor.
    fn discover(dir: &Path) -> Option<PathBuf> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let candidate = dir.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            current = dir.parent();
        }
        None
    }

    /// Apply CLI overrides.
    fn apply_cli_settings(&mut self, cli: &CliSettings) {
        if let Some(host) = &cli.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(index) = &cli.index {
            self.serve.index.clone_from(index);
        }
        if let Some(spa) = cli.spa {
            self.serve.spa = spa;
        }
        if let Some(enabled) = cli.live_reload_enabled {
            self.live_reload.enabled = enabled;
        }
    }
}

/// Configuration error type.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Config file could not be parsed.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
