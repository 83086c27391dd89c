// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential provider stand-in.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use nuketune_core::{CredentialProvider, NukeError};

/// Hands out a fixed token, or fails the way an expired sign-in does.
#[derive(Debug, Clone)]
pub struct MockCredential {
    token: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every call fails with `InteractionRequired`.
    pub fn signed_out() -> Self {
        Self {
            token: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialProvider for MockCredential {
    async fn access_token(&self) -> Result<String, NukeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.token
            .clone()
            .ok_or_else(|| NukeError::InteractionRequired("no cached sign-in".to_string()))
    }
}
