// SPDX-FileCopyrightText: 2026 NukeTune Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of Graph error responses into [`ApiError`].

use nuketune_core::error::UNKNOWN_ERROR_CODE;
use nuketune_core::ApiError;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use crate::types::GraphErrorResponse;

const REQUEST_ID_HEADER: &str = "request-id";

/// Builds an [`ApiError`] from a failed response.
///
/// The JSON envelope wins when present; the `request-id` header fills in a
/// missing request id. Bodies that are not a Graph envelope keep the
/// status and fall back to `UnknownError` with the raw body as message.
pub fn parse_graph_error(status: StatusCode, headers: &HeaderMap, body: &str) -> ApiError {
    let header_request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let (code, message, request_id) = match serde_json::from_str::<GraphErrorResponse>(body) {
        Ok(parsed) => (
            parsed.error.code,
            parsed.error.message,
            parsed.error.inner_error.and_then(|inner| inner.request_id),
        ),
        Err(_) => (None, None, None),
    };

    let message = message
        .filter(|m| !m.is_empty())
        .or_else(|| Some(body.trim()).filter(|b| !b.is_empty()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("An unknown error occurred")
                .to_string()
        });

    let mut error = ApiError::new(
        status.as_u16(),
        code.filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
        message,
    );
    if let Some(id) = request_id.or(header_request_id) {
        error = error.with_request_id(id);
    }
    error
}
