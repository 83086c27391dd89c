// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential providers.
//!
//! Interactive sign-in is out of scope; tokens come either from
//! configuration or from an external command such as
//! `az account get-access-token --resource-type ms-graph --query accessToken -o tsv`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nuketune_config::model::AuthConfig;
use nuketune_core::{CredentialProvider, NukeError};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// Environment variable consulted when the config carries no token.
pub const ACCESS_TOKEN_ENV: &str = "NUKETUNE_ACCESS_TOKEN";

/// How long a token printed by the token command is reused.
const COMMAND_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

/// Hands out one pre-acquired token.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, NukeError> {
        Ok(self.token.expose_secret().to_string())
    }
}

/// Runs a shell command and uses its trimmed stdout as the bearer token.
///
/// The token is cached for a few minutes so a run does not spawn one
/// process per request.
pub struct CommandTokenProvider {
    command: String,
    ttl: Duration,
    cached: Mutex<Option<(SecretString, Instant)>>,
}

impl CommandTokenProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ttl: COMMAND_TOKEN_TTL,
            cached: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn run_command(&self) -> Result<String, NukeError> {
        debug!(command = %self.command, "running token command");
        let output = shell_command(&self.command)
            .output()
            .await
            .map_err(|e| NukeError::Auth {
                message: format!("failed to run token command: {e}"),
                source: Some(Box::new(e)),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            if needs_sign_in(&stderr) {
                return Err(NukeError::InteractionRequired(stderr.trim().to_string()));
            }
            return Err(NukeError::Auth {
                message: format!(
                    "token command exited with {}: {}",
                    output.status,
                    stderr.trim()
                ),
                source: None,
            });
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(NukeError::InteractionRequired(
                "token command printed no token".into(),
            ));
        }
        Ok(token)
    }
}

#[async_trait]
impl CredentialProvider for CommandTokenProvider {
    async fn access_token(&self) -> Result<String, NukeError> {
        let mut cached = self.cached.lock().await;
        if let Some((token, fetched_at)) = cached.as_ref()
            && fetched_at.elapsed() < self.ttl
        {
            return Ok(token.expose_secret().to_string());
        }

        let token = self.run_command().await?;
        *cached = Some((SecretString::from(token.clone()), Instant::now()));
        Ok(token)
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> tokio::process::Command {
    let mut cmd = tokio::process::Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

fn needs_sign_in(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("az login") || lower.contains("interaction_required")
}

/// Picks a credential provider from configuration.
///
/// Resolution order: `auth.access_token` -> `NUKETUNE_ACCESS_TOKEN` ->
/// `auth.token_command` -> error.
pub fn resolve_credentials(auth: &AuthConfig) -> Result<Arc<dyn CredentialProvider>, NukeError> {
    if let Some(token) = auth.access_token.as_deref()
        && !token.trim().is_empty()
    {
        info!("using access token from configuration");
        return Ok(Arc::new(StaticTokenProvider::new(token.trim())));
    }

    if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV)
        && !token.trim().is_empty()
    {
        info!("using access token from {ACCESS_TOKEN_ENV}");
        return Ok(Arc::new(StaticTokenProvider::new(token.trim())));
    }

    if let Some(command) = auth.token_command.as_deref()
        && !command.trim().is_empty()
    {
        info!("using token command");
        return Ok(Arc::new(CommandTokenProvider::new(command)));
    }

    Err(NukeError::Config(format!(
        "no Graph credentials. Set auth.access_token, {ACCESS_TOKEN_ENV}, or auth.token_command."
    )))
}
