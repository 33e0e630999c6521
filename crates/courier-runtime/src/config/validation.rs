//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{BotConfig, CourierConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CourierConfig) -> ConfigResult<()> {
    validate_bot_config(&config.bot)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates bot settings.
fn validate_bot_config(bot: &BotConfig) -> ConfigResult<()> {
    if let Some(ref token) = bot.token {
        if token.trim().is_empty() {
            return Err(ConfigError::validation("Bot token cannot be blank"));
        }

        if token.contains(char::is_whitespace) {
            return Err(ConfigError::validation("Bot token cannot contain whitespace"));
        }
    }

    Ok(())
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.filters.keys().any(|module| module.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter module cannot be empty"));
    }

    Ok(())
}
