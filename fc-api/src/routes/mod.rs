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

//! Axum router configuration for the France Connect relying-party backend.

pub mod connect;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Build the FC router. When `route_prefix` is non-empty the two routes are
/// nested under it (e.g. prefix `fc` mounts `/fc/fc_authorize/`).
pub fn router(route_prefix: &str) -> Router<AppState> {
    let fc = Router::new()
        .route("/fc_authorize/", get(connect::fc_authorize))
        .route("/callback/", get(connect::fc_callback));

    let prefix = route_prefix.trim_matches('/');
    if prefix.is_empty() {
        fc
    } else {
        Router::new().nest(&format!("/{prefix}"), fc)
    }
}
