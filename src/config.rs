//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config PATH`, or `config.toml` in the platform config dir
//! 3. Environment variables prefixed `DUPSIFT_` (e.g. `DUPSIFT_IO_THREADS=8`)
//! 4. Command-line flags
//!
//! ```toml
//! skip_partial_fingerprinting = false
//! ignore_empty_files = true
//! io_threads = 8
//! output = "json"
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::FinderConfig;
use crate::scanner::WalkerConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPSIFT_";

/// Result rendering format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Group listing followed by the final count
    #[default]
    Text,
    /// A single JSON document
    Json,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hash every candidate in full, without partial triage.
    pub skip_partial_fingerprinting: bool,
    /// Leave zero-length files out of the results.
    pub ignore_empty_files: bool,
    /// Hashing worker threads.
    pub io_threads: usize,
    /// Follow symbolic links while walking.
    pub follow_symlinks: bool,
    /// Result format.
    pub output: OutputFormat,
    /// Print only the final count.
    pub summary_only: bool,
    /// Show progress bars on stderr.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            skip_partial_fingerprinting: false,
            ignore_empty_files: false,
            io_threads: 4,
            follow_symlinks: false,
            output: OutputFormat::Text,
            summary_only: false,
            progress: true,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A source held a value of the wrong type or an unknown variant.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),

    /// `--config` named a file that doesn't exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// `io_threads` must be at least 1.
    #[error("io_threads must be at least 1")]
    ZeroThreads,

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl Config {
    /// `config.toml` under the platform config directory, if one can be determined.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupsift", "dupsift")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Build the provider chain (defaults, file, environment).
    ///
    /// An explicit path replaces the platform default. A missing default file
    /// contributes nothing.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        Self::layered(explicit, ENV_PREFIX)
    }

    fn layered(explicit: Option<&Path>, env_prefix: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = explicit.map(Path::to_path_buf).or_else(Self::default_path);
        if let Some(path) = file {
            log::debug!("Config file: {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(env_prefix))
    }

    /// Load defaults, file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` doesn't exist, and
    /// [`ConfigError::Invalid`] if any source is malformed.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(explicit, ENV_PREFIX)
    }

    fn load_with_prefix(explicit: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }
        let config: Config = Self::layered(explicit, env_prefix).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }

    /// Apply command-line overrides. Flags only ever switch options on.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.skip_partial {
            self.skip_partial_fingerprinting = true;
        }
        if cli.no_empty {
            self.ignore_empty_files = true;
        }
        if cli.follow_symlinks {
            self.follow_symlinks = true;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if cli.json {
            self.output = OutputFormat::Json;
        }
        if cli.summary {
            self.summary_only = true;
        }
        if cli.no_progress || cli.quiet {
            self.progress = false;
        }
    }

    /// Whether progress bars should be drawn.
    #[must_use]
    pub fn show_progress(&self) -> bool {
        self.progress && self.output == OutputFormat::Text
    }

    /// Engine settings. Cancellation and progress are attached by the caller.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_skip_partial(self.skip_partial_fingerprinting)
            .with_ignore_empty(self.ignore_empty_files)
            .with_io_threads(self.io_threads)
            .with_walker_config(WalkerConfig::new(self.follow_symlinks))
    }

    /// Effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Serialize`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
