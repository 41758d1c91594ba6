use crate::config::types::{Config, EngineConfig, OutputConfig, ParserConfig, ThreadConfig};
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_engine_config(&config.engine)?;
    validate_thread_config(&config.thread)?;
    validate_parser_config(&config.parser)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates polling and transfer settings
fn validate_engine_config(config: &EngineConfig) -> Result<(), ConfigError> {
    if config.retry_delay < 1000 {
        return Err(ConfigError::Validation(format!(
            "retry-delay must be >= 1000ms, got {}ms",
            config.retry_delay
        )));
    }

    if config.page_timeout == 0 {
        return Err(ConfigError::Validation(
            "page-timeout must be greater than 0".to_string(),
        ));
    }

    if config.file_timeout == 0 {
        return Err(ConfigError::Validation(
            "file-timeout must be greater than 0".to_string(),
        ));
    }

    if config.default_concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "default-concurrency must be >= 1, got {}",
            config.default_concurrency
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the accepted thread hosts
fn validate_thread_config(config: &ThreadConfig) -> Result<(), ConfigError> {
    if config.hosts.is_empty() {
        return Err(ConfigError::Validation(
            "at least one thread host must be configured".to_string(),
        ));
    }

    for host in &config.hosts {
        validate_host_pattern(host)?;
    }

    Ok(())
}

/// Validates that every selector compiles
fn validate_parser_config(config: &ParserConfig) -> Result<(), ConfigError> {
    for (key, selector) in [
        ("file-selector", &config.file_selector),
        ("link-selector", &config.link_selector),
        ("name-selector", &config.name_selector),
        ("archived-selector", &config.archived_selector),
    ] {
        if Selector::parse(selector).is_err() {
            return Err(ConfigError::Validation(format!(
                "{} is not a valid CSS selector: '{}'",
                key, selector
            )));
        }
    }

    if config.generic_names.iter().any(|name| name.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "generic-names cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.base_dir.is_empty() {
        return Err(ConfigError::Validation(
            "base-dir cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates a host pattern (supports a leading `*.` wildcard)
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Host pattern '{}' has no host after the wildcard",
            pattern
        )));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}
