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

//! Shared application state passed to every Axum handler via `State`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, ProviderConfig};
use crate::db::ConnectionRepository;
use crate::users::UserResolver;

/// Outbound calls to the provider should not hang on reqwest's default
/// (no timeout): the callback handler holds a live browser request.
const PROVIDER_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the timeout-bounded client used for every provider call (token and
/// userinfo endpoints). Built once at composition time and shared.
pub fn provider_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(PROVIDER_HTTP_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Connection persistence, swappable at composition time.
    pub connections: Arc<dyn ConnectionRepository>,
    /// User resolution collaborator, swappable at composition time.
    pub users: Arc<dyn UserResolver>,
    /// France Connect provider configuration.
    pub provider: ProviderConfig,
    /// HTTP client for the provider's token and userinfo endpoints.
    pub http: reqwest::Client,
    /// Cookie name correlating a browser session to a Connection id.
    pub session_key: String,
    /// Local fallback page for recoverable token-exchange failures.
    pub retry_url: String,
    /// Local fallback page for user-resolution failures.
    pub home_url: String,
}

impl AppState {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        users: Arc<dyn UserResolver>,
        config: &Config,
        http: reqwest::Client,
    ) -> Self {
        Self {
            connections,
            users,
            provider: config.provider.clone(),
            http,
            session_key: config.session_key.clone(),
            retry_url: config.retry_url.clone(),
            home_url: config.home_url.clone(),
        }
    }
}
