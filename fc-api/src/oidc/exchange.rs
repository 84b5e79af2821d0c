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

//! Authorization code → token exchange against the provider's token endpoint.

use serde::Deserialize;

use crate::config::ProviderConfig;

/// Parsed response from the token endpoint.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Recoverable upstream failure during the token exchange.
///
/// Carries the full diagnostic (endpoint, status, raw body) for operator
/// logging. Callers must never forward any of it to the end user.
#[derive(Debug)]
pub enum ExchangeError {
    /// The provider was unreachable or the body could not be read.
    Transport(String),
    /// The response body was not valid JSON.
    InvalidJson {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The response JSON lacked an `access_token`.
    MissingAccessToken { endpoint: String, body: String },
}

impl std::fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExchangeError::Transport(detail) => {
                write!(f, "token request failed: {detail}")
            }
            ExchangeError::InvalidJson {
                endpoint,
                status,
                body,
            } => write!(
                f,
                "request to {endpoint} failed. Status code: {status}, body: {body}"
            ),
            ExchangeError::MissingAccessToken { endpoint, body } => write!(
                f,
                "no access_token returned when requesting {endpoint}. JSON response: {body}"
            ),
        }
    }
}

impl std::error::Error for ExchangeError {}

/// POST the authorization code to the provider's token endpoint.
///
/// A non-JSON body or a JSON body without `access_token` is a recoverable
/// error, not a hard failure: the caller logs it and sends the user to a
/// retry page.
pub async fn exchange_code(
    http: &reqwest::Client,
    provider: &ProviderConfig,
    code: &str,
) -> Result<TokenResponse, ExchangeError> {
    let token_url = format!("{}/token", provider.base_url);
    let params = [
        ("grant_type", "authorization_code"),
        ("redirect_uri", &provider.callback_uri()),
        ("client_id", &provider.client_id),
        ("client_secret", &provider.client_secret),
        ("code", code),
    ];

    let response = http
        .post(&token_url)
        .header(reqwest::header::ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| ExchangeError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| ExchangeError::Transport(e.to_string()))?;

    let content: serde_json::Value =
        serde_json::from_str(&body).map_err(|_| ExchangeError::InvalidJson {
            endpoint: token_url.clone(),
            status,
            body: body.clone(),
        })?;

    if content.get("access_token").and_then(|v| v.as_str()).is_none() {
        return Err(ExchangeError::MissingAccessToken {
            endpoint: token_url,
            body: content.to_string(),
        });
    }

    serde_json::from_value(content).map_err(|e| ExchangeError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_json_error_carries_full_diagnostic() {
        let err = ExchangeError::InvalidJson {
            endpoint: "https://fcp/token".to_string(),
            status: 502,
            body: "<html>Bad Gateway</html>".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("https://fcp/token"));
        assert!(msg.contains("502"));
        assert!(msg.contains("Bad Gateway"));
    }

    #[test]
    fn missing_access_token_error_carries_body() {
        let err = ExchangeError::MissingAccessToken {
            endpoint: "https://fcp/token".to_string(),
            body: r#"{"error":"invalid_grant"}"#.to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("no access_token"));
        assert!(msg.contains("invalid_grant"));
    }

    #[test]
    fn token_response_tolerates_extra_fields() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"access_token":"tok","token_type":"Bearer","expires_in":60,"id_token":"jwt"}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "tok");
        assert_eq!(parsed.id_token.as_deref(), Some("jwt"));
    }
}
