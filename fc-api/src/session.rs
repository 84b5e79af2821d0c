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

//! Axum extractor that pulls the current Connection id from the session cookie.
//!
//! A preceding, application-level step creates the Connection and stores its
//! id in a cookie; the cookie name is configurable (`FC_SESSION_KEY`, default
//! `connection`).

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::error::AppError;
use crate::state::AppState;

/// Extractor that resolves the Connection id for the browser session.
///
/// Usage in a handler:
/// ```ignore
/// async fn my_handler(ConnectionSession(id): ConnectionSession) { ... }
/// ```
#[derive(Debug)]
pub struct ConnectionSession(pub i64);

impl FromRequestParts<AppState> for ConnectionSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookie_header = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        let prefix = format!("{}=", state.session_key);
        for pair in cookie_header.split(';') {
            let pair = pair.trim();
            if let Some(value) = pair.strip_prefix(prefix.as_str()) {
                if let Ok(id) = value.trim().parse::<i64>() {
                    return Ok(ConnectionSession(id));
                }
            }
        }

        tracing::info!("No usable session cookie on authorize request");
        Err(AppError::forbidden())
    }
}
