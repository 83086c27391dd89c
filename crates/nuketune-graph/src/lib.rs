// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Microsoft Graph adapter for NukeTune.
//!
//! Implements [`ObjectApi`](nuketune_core::ObjectApi) over the Graph REST
//! API and provides the credential providers the binary can choose from.

pub mod auth;
pub mod client;
pub mod error;
pub mod types;

pub use auth::{resolve_credentials, CommandTokenProvider, StaticTokenProvider};
pub use client::GraphClient;
pub use error::parse_graph_error;
