// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the NukeTune configuration system.

use nuketune_config::diagnostic::{suggest_key, ConfigError};
use nuketune_config::model::NukeTuneConfig;
use nuketune_config::{load_and_validate_str, load_config_from_str};
use nuketune_core::CloudEnvironment;

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[general]
log_level = "debug"
export_dir = "/var/log/nuketune"

[graph]
cloud = "usgov"
timeout_secs = 30

[auth]
token_command = "az account get-access-token --query accessToken -o tsv"
tenant_id = "contoso.onmicrosoft.com"

[deletion]
batch_size = 5
chunk_delay_ms = 200
pause_poll_ms = 250
confirmation_phrase = "NUKE"

[rate_limit]
enabled = true
requests_per_second = 10

[retry]
max_retries = 4
initial_delay_ms = 500
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.general.export_dir, "/var/log/nuketune");
    assert_eq!(config.graph.cloud, CloudEnvironment::UsGov);
    assert_eq!(config.graph.endpoint(), "https://graph.microsoft.us");
    assert_eq!(config.graph.timeout_secs, 30);
    assert!(config.auth.access_token.is_none());
    assert_eq!(
        config.auth.tenant_id.as_deref(),
        Some("contoso.onmicrosoft.com")
    );
    assert_eq!(config.deletion.batch_size, 5);
    assert_eq!(config.deletion.chunk_delay_ms, 200);
    assert_eq!(config.deletion.pause_poll_ms, 250);
    assert_eq!(config.deletion.confirmation_phrase, "NUKE");
    assert!(config.rate_limit.enabled);
    assert_eq!(config.rate_limit.requests_per_second, 10);
    assert_eq!(config.retry.max_retries, 4);
    assert_eq!(config.retry.initial_delay_ms, 500);
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML is valid");
    assert_eq!(config.general.log_level, "info");
    assert_eq!(config.graph.cloud, CloudEnvironment::Global);
    assert_eq!(config.deletion.batch_size, 3);
    assert_eq!(config.deletion.chunk_delay_ms, 300);
    assert!(!config.rate_limit.enabled);
}

#[test]
fn unknown_cloud_is_rejected() {
    let toml = r#"
[graph]
cloud = "mars"
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Dotted overrides are what the env provider produces after key mapping.
#[test]
fn dotted_override_sets_nested_key() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[deletion]
batch_size = 2
"#;

    let config: NukeTuneConfig = Figment::new()
        .merge(Serialized::defaults(NukeTuneConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("deletion.batch_size", 7))
        .merge(("auth.access_token", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.deletion.batch_size, 7);
    assert_eq!(config.auth.access_token.as_deref(), Some("from-env"));
}

#[test]
fn missing_config_files_silently_skipped() {
    let config = nuketune_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/path/nuketune.toml",
    ))
    .expect("missing file should be silently skipped");
    assert_eq!(config.deletion.confirmation_phrase, "DELETE");
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

#[test]
fn typo_suggests_closest_key() {
    let valid_keys = &["requests_per_second", "enabled"];
    assert_eq!(
        suggest_key("request_per_second", valid_keys),
        Some("requests_per_second".to_string())
    );
}

#[test]
fn unknown_key_error_carries_suggestion() {
    let toml = r#"
[deletion]
batch_sise = 4
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey {
                key,
                suggestion,
                valid_keys,
                ..
            } => Some((key, suggestion, valid_keys)),
            _ => None,
        })
        .expect("should have an UnknownKey error");

    assert_eq!(unknown.0, "batch_sise");
    assert_eq!(unknown.1.as_deref(), Some("batch_size"));
    assert!(unknown.2.contains("chunk_delay_ms"));
}

#[test]
fn invalid_type_names_the_key() {
    let toml = r#"
[deletion]
batch_size = "three"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::InvalidType { key, .. } if key.contains("batch_size")
        )),
        "got: {errors:?}"
    );
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "log_levl".to_string(),
        suggestion: Some("log_level".to_string()),
        valid_keys: "log_level, export_dir".to_string(),
        span: None,
        src: None,
    };
    assert!(error.code().is_some());
    let help = error.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("did you mean `log_level`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("log_levl"));
}

#[test]
fn validation_rejects_zero_batch_size() {
    let toml = r#"
[deletion]
batch_size = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero batch size should fail");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::Validation { field, .. } if field == "deletion.batch_size"
    )));
}

#[test]
fn load_and_validate_accepts_overrides() {
    let toml = r#"
[general]
log_level = "warn"
"#;
    let config = load_and_validate_str(toml).expect("valid TOML should validate");
    assert_eq!(config.general.log_level, "warn");
}
