// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for NukeTune.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use nuketune_core::CloudEnvironment;
use serde::{Deserialize, Serialize};

/// Top-level NukeTune configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NukeTuneConfig {
    /// Logging and output settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Graph API endpoint settings.
    #[serde(default)]
    pub graph: GraphConfig,

    /// Credential settings.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Deletion pacing and confirmation settings.
    #[serde(default)]
    pub deletion: DeletionConfig,

    /// Optional client-side request rate limiting.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy for list requests.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl NukeTuneConfig {
    /// Copy of the configuration safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.auth.access_token.is_some() {
            copy.auth.access_token = Some("********".to_string());
        }
        copy
    }
}

/// Logging and output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory exported deletion logs are written to.
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            export_dir: default_export_dir(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_export_dir() -> String {
    ".".to_string()
}

/// Graph API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
    /// National cloud hosting the tenant.
    #[serde(default)]
    pub cloud: CloudEnvironment,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Overrides the cloud's Graph endpoint (proxies, test servers).
    #[serde(default)]
    pub base_url: Option<String>,
}

impl GraphConfig {
    /// Graph host to talk to, honoring the override.
    pub fn endpoint(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.cloud.graph_endpoint().to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            cloud: CloudEnvironment::default(),
            timeout_secs: default_timeout_secs(),
            base_url: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

/// Credential configuration.
///
/// Resolution order: `access_token` -> `NUKETUNE_ACCESS_TOKEN` env var ->
/// `token_command` -> error.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Pre-acquired bearer token for Graph.
    #[serde(default)]
    pub access_token: Option<String>,

    /// Shell command printing a bearer token on stdout.
    #[serde(default)]
    pub token_command: Option<String>,

    /// Tenant the token belongs to, used for the authority URL.
    #[serde(default)]
    pub tenant_id: Option<String>,
}

/// Deletion pacing and confirmation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeletionConfig {
    /// Deletes issued concurrently per chunk.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between chunks in milliseconds.
    #[serde(default = "default_chunk_delay_ms")]
    pub chunk_delay_ms: u64,

    /// How often a paused item re-checks the pause flag, in milliseconds.
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// Phrase the user must type to confirm a run.
    #[serde(default = "default_confirmation_phrase")]
    pub confirmation_phrase: String,
}

impl DeletionConfig {
    pub fn chunk_delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }
}

impl Default for DeletionConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            chunk_delay_ms: default_chunk_delay_ms(),
            pause_poll_ms: default_pause_poll_ms(),
            confirmation_phrase: default_confirmation_phrase(),
        }
    }
}

fn default_batch_size() -> usize {
    3
}

fn default_chunk_delay_ms() -> u64 {
    300
}

fn default_pause_poll_ms() -> u64 {
    500
}

fn default_confirmation_phrase() -> String {
    "DELETE".to_string()
}

/// Client-side rate limiting for Graph list requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            requests_per_second: default_requests_per_second(),
        }
    }
}

fn default_requests_per_second() -> u32 {
    5
}

/// Exponential backoff for retryable list failures.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Total attempts per list page; 1 disables retrying.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the second attempt, doubled for each one after.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl RetryConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_pacing() {
        let config = NukeTuneConfig::default();
        assert_eq!(config.deletion.batch_size, 3);
        assert_eq!(config.deletion.chunk_delay(), Duration::from_millis(300));
        assert_eq!(config.deletion.pause_poll(), Duration::from_millis(500));
        assert_eq!(config.deletion.confirmation_phrase, "DELETE");
        assert!(!config.rate_limit.enabled);
        assert_eq!(config.rate_limit.requests_per_second, 5);
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn endpoint_prefers_override() {
        let mut graph = GraphConfig::default();
        assert_eq!(graph.endpoint(), "https://graph.microsoft.com");
        graph.cloud = CloudEnvironment::China;
        assert_eq!(graph.endpoint(), "https://microsoftgraph.chinacloudapi.cn");
        graph.base_url = Some("http://127.0.0.1:8080".into());
        assert_eq!(graph.endpoint(), "http://127.0.0.1:8080");
    }

    #[test]
    fn redacted_hides_token() {
        let mut config = NukeTuneConfig::default();
        config.auth.access_token = Some("eyJ0eXAi".into());
        let redacted = config.redacted();
        assert_eq!(redacted.auth.access_token.as_deref(), Some("********"));
        assert_eq!(config.auth.access_token.as_deref(), Some("eyJ0eXAi"));
    }
}
