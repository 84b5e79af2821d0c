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

//! User resolution: turning a completed Connection into a local identity.
//!
//! The callback orchestrator delegates here after the ID token validates.
//! The default implementation asks the provider's UserInfo endpoint using
//! the Connection's access token; tests plug in canned resolvers.

use serde::Deserialize;

use crate::config::ProviderConfig;
use crate::db::Connection;

/// Identity the resolver hands back on success. `sub` is the provider's
/// stable subject identifier; the profile claims mirror the requested scopes.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedIdentity {
    pub sub: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub birthdate: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub preferred_username: Option<String>,
}

/// User resolution failed; `message` is safe to display to the end user.
#[derive(Debug)]
pub struct ResolveError {
    pub message: String,
}

impl ResolveError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResolveError {}

/// Collaborator that reconciles a returned identity with a local user record.
#[async_trait::async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve_user(
        &self,
        connection: &Connection,
    ) -> Result<ResolvedIdentity, ResolveError>;
}

const RESOLVE_FAILED_MESSAGE: &str =
    "We could not retrieve your identity from France Connect. Please try again.";

/// Default resolver: fetches the claims from the provider's UserInfo endpoint
/// with the Connection's access token.
pub struct UserInfoResolver {
    http: reqwest::Client,
    provider: ProviderConfig,
}

impl UserInfoResolver {
    pub fn new(http: reqwest::Client, provider: ProviderConfig) -> Self {
        Self { http, provider }
    }
}

#[async_trait::async_trait]
impl UserResolver for UserInfoResolver {
    async fn resolve_user(
        &self,
        connection: &Connection,
    ) -> Result<ResolvedIdentity, ResolveError> {
        let access_token = connection.access_token.as_deref().ok_or_else(|| {
            tracing::error!(
                "UserInfo requested for connection {} without an access token",
                connection.id
            );
            ResolveError::new(RESOLVE_FAILED_MESSAGE)
        })?;

        let userinfo_url = format!("{}/userinfo", self.provider.base_url);
        let resp = self
            .http
            .get(&userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("UserInfo request to {userinfo_url} failed: {e}");
                ResolveError::new(RESOLVE_FAILED_MESSAGE)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            tracing::error!("UserInfo endpoint returned HTTP {status}: {body}");
            return Err(ResolveError::new(RESOLVE_FAILED_MESSAGE));
        }

        resp.json::<ResolvedIdentity>().await.map_err(|e| {
            tracing::error!("Failed to parse UserInfo response: {e}");
            ResolveError::new(RESOLVE_FAILED_MESSAGE)
        })
    }
}
