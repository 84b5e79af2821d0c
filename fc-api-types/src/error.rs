/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! API error types.
//!
//! Every failed API response is returned as `APIResponse<APIError>` with `success: false`.

use serde::{Deserialize, Serialize};

/// Structured error returned in the `result` field of a failed [`super::APIResponse`].
///
/// The `code` field is a machine-readable identifier (e.g. `"FORBIDDEN"`).
/// The `message` field is a human-readable description suitable for display.
/// The `engineering_error` field carries debug-level detail (DB errors, upstream
/// bodies) that is useful during development but should be stripped or redacted
/// in production.
///
/// Security-relevant rejections (`forbidden`, `connection_expired`) never carry
/// provider-supplied text in any field.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct APIError {
    /// Machine-readable error code (e.g. `"FORBIDDEN"`, `"CONNECTION_EXPIRED"`).
    pub code: String,

    /// Human-readable error message.
    pub message: String,

    /// Optional engineering-level detail for debugging.
    /// Should be omitted or redacted in production responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engineering_error: Option<String>,
}

impl APIError {
    pub fn forbidden() -> Self {
        Self {
            code: "FORBIDDEN".to_string(),
            message: "Access denied.".to_string(),
            engineering_error: None,
        }
    }

    pub fn connection_expired() -> Self {
        Self {
            code: "CONNECTION_EXPIRED".to_string(),
            message: "Your France Connect session has expired. Please start over."
                .to_string(),
            engineering_error: None,
        }
    }

    pub fn internal_error(detail: &str) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: "Internal server error".to_string(),
            engineering_error: Some(detail.to_string()),
        }
    }
}

impl std::fmt::Display for APIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for APIError {}
