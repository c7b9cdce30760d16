use crate::config::types::{
    BatchConfig, Config, ExtractConfig, ScheduleConfig, TargetEntry, UserAgentConfig,
};
use crate::trigger::parse_time_of_day;
use crate::url::parse_target_url;
use crate::ConfigError;
use std::collections::HashSet;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_batch_config(&config.batch)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extract_config(&config.extract)?;
    validate_schedule_config(&config.schedule)?;
    validate_targets(&config.targets)?;
    Ok(())
}

/// Validates batch coordinator configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if let Some(limit) = config.concurrency_limit {
        if !(1..=100).contains(&limit) {
            return Err(ConfigError::Validation(format!(
                "concurrency_limit must be between 1 and 100, got {}",
                limit
            )));
        }
    }

    if config.timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 100ms, got {}ms",
            config.timeout
        )));
    }

    if config.connect_timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout must be >= 100ms, got {}ms",
            config.connect_timeout
        )));
    }

    if config.retries > 10 {
        return Err(ConfigError::Validation(format!(
            "retries must be <= 10, got {}",
            config.retries
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user agent cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates extraction rules
fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.keywords.is_empty() {
        return Err(ConfigError::Validation(
            "keywords must contain at least one entry".to_string(),
        ));
    }

    if config.keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "keywords cannot contain blank entries".to_string(),
        ));
    }

    if config.discussion_marker.is_empty() {
        return Err(ConfigError::Validation(
            "discussion_marker cannot be empty".to_string(),
        ));
    }

    if config.title_limit < 1 {
        return Err(ConfigError::Validation(
            "title_limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the daily trigger configuration
fn validate_schedule_config(config: &ScheduleConfig) -> Result<(), ConfigError> {
    for time in &config.times {
        parse_time_of_day(time)?;
    }

    if config.poll_interval < 1 {
        return Err(ConfigError::Validation(
            "poll_interval must be >= 1 second".to_string(),
        ));
    }

    Ok(())
}

/// Validates target entries
fn validate_targets(targets: &[TargetEntry]) -> Result<(), ConfigError> {
    if targets.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[target]] is required".to_string(),
        ));
    }

    let mut names = HashSet::new();
    for entry in targets {
        let url = parse_target_url(&entry.url).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid target URL '{}': {}", entry.url, e))
        })?;

        let name = match &entry.name {
            Some(name) if name.trim().is_empty() => {
                return Err(ConfigError::Validation(format!(
                    "Target '{}' has a blank name",
                    entry.url
                )));
            }
            Some(name) => name.clone(),
            None => crate::url::derive_target_name(&url),
        };

        if !names.insert(name.clone()) {
            return Err(ConfigError::Validation(format!(
                "Duplicate target name '{}'",
                name
            )));
        }
    }

    Ok(())
}
