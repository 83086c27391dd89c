// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for NukeTune integration tests.
//!
//! Provides mock collaborators and a harness for fast, deterministic tests
//! without a tenant.
//!
//! # Components
//!
//! - [`MockObjectApi`] - In-memory object API with scripted pages and failures
//! - [`MockCredential`] - Fixed-token credential provider
//! - [`TestHarness`] - Engine plus mock API, driving a full run

pub mod harness;
pub mod mock_api;
pub mod mock_credential;

pub use harness::{objects, TestHarness};
pub use mock_api::{DeleteCall, MockObjectApi};
pub use mock_credential::MockCredential;
