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

//! Application configuration loaded from environment variables.

use std::env;

/// Configuration for the France Connect relying-party backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the HTTP server (e.g. "0.0.0.0:8081").
    pub listen_addr: String,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// France Connect provider configuration.
    pub provider: ProviderConfig,
    /// Route prefix the FC routes are nested under (empty = mounted at root).
    pub route_prefix: String,
    /// Name of the cookie correlating a browser session to a Connection id.
    pub session_key: String,
    /// Local page the user is redirected to when the token exchange fails.
    pub retry_url: String,
    /// Local page the user is redirected to when user resolution fails.
    pub home_url: String,
}

/// France Connect provider configuration.
///
/// France Connect v1 signs ID tokens with the client secret (HS256), so
/// `client_secret` doubles as the JWT verification key.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider base URL (e.g. "https://fcp.integ01.dev-franceconnect.fr/api/v1").
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Base URL the provider redirects back to; the callback redirect URI is
    /// `{callback_base_url}/callback` and the post-logout redirect URI is
    /// `{callback_base_url}/logout-callback`.
    pub callback_base_url: String,
    /// Connection time-to-live in seconds (default: 300).
    pub connection_ttl_secs: i64,
    /// Whether to request the `preferred_username` scope.
    pub preferred_username: bool,
}

impl ProviderConfig {
    /// The redirect URI registered with the provider.
    pub fn callback_uri(&self) -> String {
        format!("{}/callback", self.callback_base_url)
    }

    /// The post-logout redirect URI passed to the provider's logout endpoint.
    pub fn logout_callback_uri(&self) -> String {
        format!("{}/logout-callback", self.callback_base_url)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Required
    /// - `DATABASE_URL`
    /// - `FC_BASE_URL`, `FC_CLIENT_ID`, `FC_CLIENT_SECRET`, `FC_CALLBACK_BASE_URL`
    ///
    /// # Optional
    /// - `LISTEN_ADDR` (default: `"0.0.0.0:8081"`)
    /// - `FC_CONNECTION_TTL_SECS` (default: `"300"`)
    /// - `FC_PREFERRED_USERNAME` (default: `"true"`)
    /// - `FC_ROUTE_PREFIX` (default: empty)
    /// - `FC_SESSION_KEY` (default: `"connection"`)
    /// - `RETRY_URL`, `HOME_URL` (default: `"/"`)
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let listen_addr = env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8081".to_string());
        let route_prefix = env::var("FC_ROUTE_PREFIX").unwrap_or_default();
        let session_key = env::var("FC_SESSION_KEY").unwrap_or_else(|_| "connection".to_string());
        let retry_url = env::var("RETRY_URL").unwrap_or_else(|_| "/".to_string());
        let home_url = env::var("HOME_URL").unwrap_or_else(|_| "/".to_string());

        let provider = ProviderConfig {
            base_url: env::var("FC_BASE_URL")
                .map_err(|_| "FC_BASE_URL environment variable is required")?,
            client_id: env::var("FC_CLIENT_ID")
                .map_err(|_| "FC_CLIENT_ID environment variable is required")?,
            client_secret: env::var("FC_CLIENT_SECRET")
                .map_err(|_| "FC_CLIENT_SECRET environment variable is required")?,
            callback_base_url: env::var("FC_CALLBACK_BASE_URL")
                .map_err(|_| "FC_CALLBACK_BASE_URL environment variable is required")?,
            connection_ttl_secs: env::var("FC_CONNECTION_TTL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse::<i64>()
                .map_err(|_| "FC_CONNECTION_TTL_SECS must be a valid integer")?,
            preferred_username: parse_bool(
                env::var("FC_PREFERRED_USERNAME").ok().as_deref(),
                true,
            )?,
        };

        Ok(Self {
            listen_addr,
            database_url,
            provider,
            route_prefix,
            session_key,
            retry_url,
            home_url,
        })
    }
}

/// Parse a boolean environment value. Accepts any casing of
/// "true"/"yes"/"false"/"no" as well as "0" and "1"; anything else is an error.
fn parse_bool(value: Option<&str>, default: bool) -> Result<bool, String> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        other => Err(format!(
            "invalid boolean value {other:?}; authorized values are any casing of \
             \"true\", \"yes\", \"false\", \"no\" as well as 0 and 1"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_casing_variants() {
        assert!(parse_bool(Some("TRUE"), false).unwrap());
        assert!(parse_bool(Some("Yes"), false).unwrap());
        assert!(!parse_bool(Some("no"), true).unwrap());
        assert!(!parse_bool(Some("0"), true).unwrap());
        assert!(parse_bool(Some("1"), false).unwrap());
    }

    #[test]
    fn parse_bool_uses_default_when_unset() {
        assert!(parse_bool(None, true).unwrap());
        assert!(!parse_bool(None, false).unwrap());
    }

    #[test]
    fn parse_bool_rejects_garbage() {
        assert!(parse_bool(Some("maybe"), true).is_err());
    }

    #[test]
    fn callback_uris_derive_from_base() {
        let provider = ProviderConfig {
            base_url: "https://fcp.example.fr/api/v1".to_string(),
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            callback_base_url: "http://localhost:3000".to_string(),
            connection_ttl_secs: 300,
            preferred_username: true,
        };
        assert_eq!(provider.callback_uri(), "http://localhost:3000/callback");
        assert_eq!(
            provider.logout_callback_uri(),
            "http://localhost:3000/logout-callback"
        );
    }
}
