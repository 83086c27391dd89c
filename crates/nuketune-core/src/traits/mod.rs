// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams to the external collaborators the engine depends on.
//!
//! Both traits use `#[async_trait]` so they can be held as trait objects.

pub mod credential;
pub mod object_api;

pub use credential::CredentialProvider;
pub use object_api::ObjectApi;
