//! Configuration loader using figment.
//!
//! This module provides a layered configuration loading system that supports:
//!
//! - **Multiple sources**: TOML/YAML files, environment variables, programmatic defaults
//! - **Layered configuration**: Later sources override earlier ones
//! - **Profile support**: Development vs production configurations
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`courier.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`courier.yaml`, `courier.yml`, etc.)
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic overrides passed to [`ConfigLoader::merge`]
//! 3. Profile-specific config file (`courier.{profile}.toml`)
//! 4. Main config file (`courier.toml`)
//! 5. Environment variables (`COURIER_*`)
//! 6. The `SLACK_TOKEN` environment variable, for `bot.token`, when non-empty
//!
//! The legacy `bot.ignore-bot-message` key is still read; when present it
//! sets `bot.suppress_bot_messages`.
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `COURIER_` prefix with `__` as separator:
//!
//! - `COURIER_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `COURIER_BOT__SUPPRESS_BOT_MESSAGES=true` → `bot.suppress_bot_messages = true`
//!
//! # Example
//!
//! ```rust,ignore
//! use courier_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/courier.toml")
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::CourierConfig;
use super::validation::validate_config;

/// Environment variable that overrides `bot.token`.
pub const TOKEN_ENV_VAR: &str = "SLACK_TOKEN";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Parses a profile name.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Reads the profile from `COURIER_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("COURIER_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// File names looked up in each search directory, in order of preference.
///
/// Names whose format feature is disabled are skipped.
const CONFIG_FILE_NAMES: &[&str] = &[
    "courier.toml",
    "config.toml",
    "courier.yaml",
    "courier.yml",
    "config.yaml",
    "config.yml",
];

/// Configuration loader with figment-based multi-source support.
pub struct ConfigLoader {
    /// Programmatic overrides, layered below files and environment.
    overrides: Figment,
    profile: Profile,
    /// Directories searched for [`CONFIG_FILE_NAMES`].
    search_paths: Vec<PathBuf>,
    load_env: bool,
    /// Explicit config file; disables the search.
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader with the profile from `COURIER_PROFILE`.
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::parse(profile.as_ref());
        self
    }

    /// Adds a directory to search for configuration files.
    ///
    /// Without any, the current directory and the user's `courier` config
    /// directory are searched.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    /// Loads this file instead of searching. Missing files are an error.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Skips `COURIER_*` and `SLACK_TOKEN`.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Layers `config` above the defaults, below files and environment.
    pub fn merge(mut self, config: CourierConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<CourierConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let mut config: CourierConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;
        config.bot.fold_legacy_keys();

        validate_config(&config)?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            suppress_bot_messages = config.bot.suppress_bot_messages,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment =
            Figment::from(Serialized::defaults(CourierConfig::default())).merge(self.overrides);

        let config_file = match self.config_file {
            Some(path) if path.exists() => Some(path),
            Some(path) => return Err(ConfigError::FileNotFound(path)),
            None => find_config_file(&self.search_paths),
        };

        match config_file {
            Some(path) => {
                let profile_path = profile_variant(&path, &self.profile);
                if profile_path.exists() {
                    debug!(path = %profile_path.display(), "Loading profile-specific config");
                    figment = merge_file(figment, &profile_path)?;
                }
                info!(path = %path.display(), "Loading configuration file");
                figment = merge_file(figment, &path)?;
            }
            None => warn!("No configuration file found, using defaults"),
        }

        if self.load_env {
            trace!("Loading environment variables with COURIER_ prefix");
            figment = figment.merge(Env::prefixed("COURIER_").ignore(&["PROFILE"]).split("__"));

            // An empty token variable leaves the configured token alone.
            if std::env::var(TOKEN_ENV_VAR).is_ok_and(|token| !token.trim().is_empty()) {
                debug!("Bot token overridden by {TOKEN_ENV_VAR}");
                figment = figment
                    .merge(Env::raw().only(&[TOKEN_ENV_VAR]).map(|_| "bot.token".into()));
            }
        }

        Ok(figment)
    }
}

fn format_enabled(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => cfg!(feature = "toml-config"),
        Some("yaml" | "yml") => cfg!(feature = "yaml-config"),
        _ => false,
    }
}

/// Returns the first existing config file across the search directories.
fn find_config_file(search_paths: &[PathBuf]) -> Option<PathBuf> {
    let mut search = search_paths.to_vec();
    if search.is_empty() {
        search.extend(std::env::current_dir().ok());
        search.extend(dirs::config_dir().map(|dir| dir.join("courier")));
    }

    search
        .iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| format_enabled(path) && path.exists())
}

/// `courier.toml` becomes `courier.production.toml`.
fn profile_variant(path: &Path, profile: &Profile) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{profile}.{ext}"),
        None => format!("{stem}.{profile}"),
    };
    path.with_file_name(name)
}

/// Merges one file, picking the provider from its extension.
fn merge_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    match ext {
        #[cfg(feature = "toml-config")]
        "toml" => Ok(figment.merge(Toml::file(path))),
        #[cfg(feature = "yaml-config")]
        "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
        _ => Err(ConfigError::ParseError(format!(
            "Unsupported or disabled configuration file format: .{ext}"
        ))),
    }
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<CourierConfig> {
    ConfigLoader::new().load()
}

/// Loads configuration from a specific file, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<CourierConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
