use crate::config::types::{CacheConfig, Config, FetcherConfig, ServerConfig};
use crate::ConfigError;
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_cache_config(&config.cache)?;
    validate_fetcher_config(&config.fetcher)?;
    Ok(())
}

/// Validates listener configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::InvalidAddress(format!("'{}': {}", config.bind_address, e))
    })?;

    if config.static_dir.is_empty() {
        return Err(ConfigError::Validation(
            "static_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates cache configuration
fn validate_cache_config(config: &CacheConfig) -> Result<(), ConfigError> {
    if config.freshness_window_minutes < 1 {
        return Err(ConfigError::Validation(format!(
            "freshness_window_minutes must be >= 1, got {}",
            config.freshness_window_minutes
        )));
    }

    Ok(())
}

/// Validates outbound fetch configuration
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.timeout_secs < 1 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 1024 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 1024, got {}",
            config.max_concurrent_fetches
        )));
    }

    Ok(())
}
