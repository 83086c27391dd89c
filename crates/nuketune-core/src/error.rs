// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for NukeTune.
//!
//! [`NukeError`] is what every trait and operation returns. [`ApiError`] is
//! the classified, loggable shape a failure takes once it reaches the
//! deletion log.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::DeletionPhase;

/// The primary error type used across all NukeTune crates.
#[derive(Debug, Error)]
pub enum NukeError {
    /// Configuration errors (invalid values, missing credentials).
    #[error("configuration error: {0}")]
    Config(String),

    /// The credential provider cannot produce a token without the user
    /// signing in again.
    #[error("interactive sign-in required: {0}")]
    InteractionRequired(String),

    /// Any other credential acquisition failure.
    #[error("authentication error: {message}")]
    Auth {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote API answered with an error status.
    #[error("{0}")]
    Api(ApiError),

    /// The request never produced a usable response (connect, TLS, decode).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Cooperative cancellation observed at a checkpoint.
    #[error("Cancelled")]
    Cancelled,

    /// No category with this id exists in the catalog.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// The session is in a phase where the requested action is not allowed.
    #[error("cannot {action} while {phase}")]
    InvalidPhase {
        action: &'static str,
        phase: DeletionPhase,
    },

    /// The typed confirmation did not match the required phrase.
    #[error("confirmation phrase did not match; type `{expected}` to proceed")]
    ConfirmationRejected { expected: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl NukeError {
    /// Shorthand for a transport failure wrapping its cause.
    pub fn transport(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        NukeError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true when the failure is the cancellation sentinel.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, NukeError::Cancelled)
    }
}

/// Code used when nothing more specific can be extracted from a failure.
pub const UNKNOWN_ERROR_CODE: &str = "UnknownError";

/// A remote failure reduced to the fields the deletion log cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status_code: u16,
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(status_code: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: code.into(),
            message: message.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Server-side faults and throttling may succeed on a later attempt.
    ///
    /// The orchestrator records this but never acts on it.
    pub fn is_retryable(&self) -> bool {
        self.status_code >= 500 || self.status_code == 429
    }

    /// Translates any [`NukeError`] into its loggable form.
    ///
    /// API errors pass through untouched; cancellation gets its own code so
    /// it can be told apart in exports; everything else collapses to a 500
    /// `UnknownError` carrying the original message.
    pub fn classify(err: &NukeError) -> Self {
        match err {
            NukeError::Api(api) => api.clone(),
            NukeError::Cancelled => ApiError::new(0, "Cancelled", "Cancelled"),
            NukeError::InteractionRequired(message) => {
                ApiError::new(401, "InteractionRequired", message.clone())
            }
            NukeError::Auth { message, .. } => {
                ApiError::new(401, "AuthenticationFailed", message.clone())
            }
            other => ApiError::new(500, UNKNOWN_ERROR_CODE, other.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.status_code, self.message)
    }
}

impl From<ApiError> for NukeError {
    fn from(err: ApiError) -> Self {
        NukeError::Api(err)
    }
}
