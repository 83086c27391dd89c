// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for NukeTune.
//!
//! Holds the types every other crate speaks in (objects, categories, log
//! entries, phases), the error type, and the two traits standing in for the
//! outside world: [`ObjectApi`] and [`CredentialProvider`].

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{ApiError, NukeError};
pub use traits::{CredentialProvider, ObjectApi};
pub use types::{
    ApiVersion, Category, CloudEnvironment, DangerLevel, DeletionLogEntry, DeletionPhase,
    DeletionStatus, ManagedObject, ObjectPage, UserInfo,
};
