use crate::config::types::{Config, HttpConfig, RateLimitConfig, RobotsConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_rate_limit_config(&config.rate_limit)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_http_config(&config.http)?;
    validate_robots_config(&config.robots)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates rate limiting configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> Result<(), ConfigError> {
    if config.max_requests < 1 {
        return Err(ConfigError::Validation(format!(
            "max_requests must be >= 1, got {}",
            config.max_requests
        )));
    }

    if !(config.time_window.is_finite() && config.time_window > 0.0) {
        return Err(ConfigError::Validation(format!(
            "time_window must be > 0 seconds, got {}",
            config.time_window
        )));
    }

    for (name, value) in [
        ("base_delay", config.base_delay),
        ("jitter_min", config.jitter_min),
        ("jitter_max", config.jitter_max),
        ("backoff_unit", config.backoff_unit),
        ("backoff_cap", config.backoff_cap),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(ConfigError::Validation(format!(
                "{} must be a non-negative number of seconds, got {}",
                name, value
            )));
        }
    }

    if config.jitter_min > config.jitter_max {
        return Err(ConfigError::Validation(format!(
            "jitter_min ({}) must not exceed jitter_max ({})",
            config.jitter_min, config.jitter_max
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if !(-12..=14).contains(&config.courtesy_utc_offset) {
        return Err(ConfigError::Validation(format!(
            "courtesy_utc_offset must be between -12 and 14, got {}",
            config.courtesy_utc_offset
        )));
    }

    if config.courtesy_start_hour > 23
        || config.courtesy_end_hour > 23
        || config.courtesy_start_hour > config.courtesy_end_hour
    {
        return Err(ConfigError::Validation(format!(
            "courtesy hours must satisfy 0 <= start <= end <= 23, got {}..{}",
            config.courtesy_start_hour, config.courtesy_end_hour
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.connect_timeout == 0 || config.read_timeout == 0 {
        return Err(ConfigError::Validation(
            "HTTP timeouts must be >= 1 second".to_string(),
        ));
    }
    Ok(())
}

fn validate_robots_config(config: &RobotsConfig) -> Result<(), ConfigError> {
    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "robots timeout must be >= 1 second".to_string(),
        ));
    }
    if !(config.high_delay_warning.is_finite() && config.high_delay_warning >= 0.0) {
        return Err(ConfigError::Validation(format!(
            "high_delay_warning must be >= 0, got {}",
            config.high_delay_warning
        )));
    }
    Ok(())
}

fn validate_output_config(config: &crate::config::types::OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("data_dir", &config.data_dir),
        ("logs_dir", &config.logs_dir),
        ("exports_dir", &config.exports_dir),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Must contain exactly one @ with text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
