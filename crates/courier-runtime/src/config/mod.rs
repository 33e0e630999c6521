//! Configuration module for the Courier runtime.
//!
//! Layered loading (defaults, files, environment) and validation of the
//! bot and logging settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, TOKEN_ENV_VAR, load_config, load_config_from_file};
pub use schema::{
    BotConfig, CourierConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig,
};
pub use validation::validate_config;
