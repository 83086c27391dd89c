// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./nuketune.toml` > `~/.config/nuketune/nuketune.toml` >
//! `/etc/nuketune/nuketune.toml` with environment variable overrides via `NUKETUNE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::NukeTuneConfig;

pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/nuketune/nuketune.toml";
pub(crate) const LOCAL_CONFIG_PATH: &str = "nuketune.toml";

pub(crate) fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("nuketune/nuketune.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/nuketune/nuketune.toml` (system-wide)
/// 3. `~/.config/nuketune/nuketune.toml` (user XDG config)
/// 4. `./nuketune.toml` (local directory)
/// 5. `NUKETUNE_*` environment variables
pub fn load_config() -> Result<NukeTuneConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<NukeTuneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NukeTuneConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NukeTuneConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NukeTuneConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(NukeTuneConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `NUKETUNE_DELETION_BATCH_SIZE` must map to
/// `deletion.batch_size`, not `deletion.batch.size`.
fn env_provider() -> Env {
    Env::prefixed("NUKETUNE_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env var name onto its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 6] = ["general", "graph", "auth", "deletion", "rate_limit", "retry"];

    // `NUKETUNE_ACCESS_TOKEN` is the documented shorthand for the token.
    if key == "access_token" {
        return "auth.access_token".to_string();
    }

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
