// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer credential acquisition.

use async_trait::async_trait;

use crate::error::NukeError;

/// Produces a bearer token valid for the remote object API.
///
/// Implementations return [`NukeError::InteractionRequired`] when the user
/// has to sign in again, so a front end can prompt instead of failing.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a currently valid access token.
    async fn access_token(&self) -> Result<String, NukeError>;
}
