// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde cannot express: positive pacing values,
//! a known log level and a non-empty confirmation phrase.

use crate::diagnostic::ConfigError;
use crate::model::NukeTuneConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of stopping at the first one.
pub fn validate_config(config: &NukeTuneConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |field: &str, message: String| {
        errors.push(ConfigError::Validation {
            field: field.to_string(),
            message,
        });
    };

    let level = config.general.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        invalid(
            "general.log_level",
            format!(
                "`{}` is not one of {}",
                config.general.log_level,
                LOG_LEVELS.join(", ")
            ),
        );
    }

    if config.general.export_dir.trim().is_empty() {
        invalid("general.export_dir", "must not be empty".to_string());
    }

    if config.graph.timeout_secs == 0 {
        invalid("graph.timeout_secs", "must be greater than 0".to_string());
    }

    if let Some(url) = &config.graph.base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        invalid(
            "graph.base_url",
            format!("`{url}` must start with http:// or https://"),
        );
    }

    if config
        .auth
        .token_command
        .as_deref()
        .is_some_and(|cmd| cmd.trim().is_empty())
    {
        invalid("auth.token_command", "must not be blank when set".to_string());
    }

    if config.deletion.batch_size == 0 {
        invalid("deletion.batch_size", "must be at least 1".to_string());
    }

    if config.deletion.pause_poll_ms == 0 {
        invalid("deletion.pause_poll_ms", "must be greater than 0".to_string());
    }

    if config.deletion.confirmation_phrase.trim().is_empty() {
        invalid(
            "deletion.confirmation_phrase",
            "must not be empty".to_string(),
        );
    }

    if config.rate_limit.requests_per_second == 0 {
        invalid(
            "rate_limit.requests_per_second",
            "must be greater than 0".to_string(),
        );
    }

    if config.retry.max_retries == 0 {
        invalid(
            "retry.max_retries",
            "must be at least 1 (1 means no retries)".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
