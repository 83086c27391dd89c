// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resilience primitives for outbound Graph calls.
//!
//! Both utilities are opt-in: the HTTP client decides whether to route a call
//! through the [`RateLimiter`] or [`retry_if`]. The deletion path uses
//! neither and relies on fixed chunk pacing instead.

pub mod backoff;
pub mod rate_limiter;

pub use backoff::{retry_if, retry_with_backoff, BackoffPolicy};
pub use rate_limiter::RateLimiter;
