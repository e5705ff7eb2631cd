//! Layered application configuration.
//!
//! Values are merged with figment, lowest priority first:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config PATH`, or `config.toml` in the platform config directory)
//! 3. Environment variables prefixed `RECORDLINK_` (`__` separates nested keys,
//!    e.g. `RECORDLINK_THRESHOLDS__FUZZY_LINK=60`)
//! 4. CLI flags, applied by the caller after loading
//!
//! ```toml
//! min_size = 1000
//! io_threads = 8
//! content_types = ["text/plain", "application/pdf", "image/png"]
//!
//! [thresholds]
//! merge = 100
//! fuzzy_link = 49
//! perceptual_link = 70
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::resolve::{ResolverConfig, Thresholds};
use crate::scanner::{default_content_types, PerceptualAlgorithm, SelectorConfig, DEFAULT_MIN_SIZE};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "RECORDLINK_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files must be strictly larger than this many bytes.
    pub min_size: u64,
    /// Files larger than this are ignored.
    pub max_size: Option<u64>,
    /// Content types that qualify a file.
    pub content_types: Vec<String>,
    /// Follow symbolic links during the walk.
    pub follow_symlinks: bool,
    /// Fingerprinting threads.
    pub io_threads: usize,
    /// Abort on the first walk or fingerprint error.
    pub strict: bool,
    /// Compute perceptual extents for images.
    pub perceptual: bool,
    /// Perceptual hash algorithm.
    pub perceptual_algorithm: PerceptualAlgorithm,
    /// Merge and link cutoffs.
    pub thresholds: Thresholds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: None,
            content_types: default_content_types(),
            follow_symlinks: false,
            io_threads: 4,
            strict: false,
            perceptual: true,
            perceptual_algorithm: PerceptualAlgorithm::default(),
            thresholds: Thresholds::default(),
        }
    }
}

impl Config {
    /// Build the figment for an optional explicit config file.
    ///
    /// Without an explicit file the platform default is used if it exists.
    #[must_use]
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(path) = Self::default_path() {
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load and validate the layered configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit file is missing, any layer
    /// fails to parse, or the merged values are invalid.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        let config: Config = Self::figment(config_file)
            .extract()
            .map_err(|e| ConfigError::Parse(Box::new(e)))?;
        config.validate()?;

        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// The platform-specific default config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "recordlink", "recordlink")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Check every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate().map_err(ConfigError::Invalid)?;
        if self.io_threads == 0 {
            return Err(ConfigError::Invalid(
                "io_threads must be at least 1".to_string(),
            ));
        }
        if let Some(max) = self.max_size {
            if max <= self.min_size {
                return Err(ConfigError::Invalid(format!(
                    "max_size ({max}) must be greater than min_size ({})",
                    self.min_size
                )));
            }
        }
        if self.content_types.is_empty() {
            return Err(ConfigError::Invalid(
                "content_types must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Candidate selection rules from this configuration.
    #[must_use]
    pub fn selector_config(&self) -> SelectorConfig {
        SelectorConfig::default()
            .with_content_types(self.content_types.clone())
            .with_min_size(self.min_size)
            .with_max_size(self.max_size)
            .with_follow_symlinks(self.follow_symlinks)
    }

    /// Resolver settings from this configuration.
    ///
    /// Shutdown flag and progress callback are left for the caller.
    #[must_use]
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default()
            .with_io_threads(self.io_threads)
            .with_strict(self.strict)
            .with_thresholds(self.thresholds)
            .with_selector(self.selector_config())
            .with_perceptual(self.perceptual)
            .with_perceptual_algorithm(self.perceptual_algorithm)
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or has the wrong shape.
    #[error("Failed to load configuration: {0}")]
    Parse(#[source] Box<figment::Error>),

    /// The merged values are inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
