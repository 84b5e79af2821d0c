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

//! Application error type that implements Axum's `IntoResponse`.
//!
//! Every error is returned as `APIResponse<APIError>` with `success: false`,
//! paired with the appropriate HTTP status code.
//!
//! The OIDC flow distinguishes two time-related rejections: a 403 for an
//! expired ID-token signature (security check failure) and a 408 for an
//! expired Connection (the user simply took too long).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fc_api_types::{APIError, APIResponse};

/// Application-level error that pairs an HTTP status code with an [`APIError`].
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub body: APIError,
}

impl AppError {
    pub fn new(status: StatusCode, body: APIError) -> Self {
        Self { status, body }
    }

    /// Protocol violation or security check failure. The reason is logged at
    /// the call site, never sent to the caller.
    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, APIError::forbidden())
    }

    /// Connection TTL exceeded: a usability condition, not a security
    /// violation, hence 408 rather than 403.
    pub fn connection_expired() -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, APIError::connection_expired())
    }

    pub fn internal(detail: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            APIError::internal_error(detail),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = APIResponse::error(self.body);
        (self.status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {err}");
        Self::internal(&err.to_string())
    }
}
