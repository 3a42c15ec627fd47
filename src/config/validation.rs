use crate::config::types::{Config, CrawlerConfig, OutputConfig};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 || config.request_timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 600, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_concurrent_fetches > 1000 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 0 and 1000, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.base_dir.is_empty() {
        return Err(ConfigError::Validation(
            "base_dir cannot be empty".to_string(),
        ));
    }

    if config.report_file.is_empty() {
        return Err(ConfigError::Validation(
            "report_file cannot be empty".to_string(),
        ));
    }

    if config.report_file.contains('/') || config.report_file.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "report_file must be a plain file name, got '{}'",
            config.report_file
        )));
    }

    if config.fixed_tags.is_empty() {
        return Err(ConfigError::Validation(
            "fixed_tags cannot be empty".to_string(),
        ));
    }

    if config.fixed_tags.iter().any(|tag| tag.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "fixed_tags cannot contain empty tags".to_string(),
        ));
    }

    Ok(())
}
