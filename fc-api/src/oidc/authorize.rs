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

//! Authorize and logout URL construction, plus state/nonce generation.

use oauth2::CsrfToken;
use url::Url;

use crate::config::ProviderConfig;

/// Claims France Connect can assert about the subject; `preferred_username`
/// is appended when configured.
const BASE_SCOPES: [&str; 8] = [
    "openid",
    "email",
    "gender",
    "birthdate",
    "birthplace",
    "given_name",
    "family_name",
    "birthcountry",
];

/// Requested assurance level (eIDAS level 1).
const ACR_VALUES: &str = "eidas1";

/// Generate an unguessable URL-safe token (16 random bytes, base64url).
///
/// Used for both `state` and `nonce`; each call yields an independent value.
pub fn random_token() -> String {
    CsrfToken::new_random().secret().clone()
}

/// Build the provider's authorize URL for one authentication attempt.
///
/// Every parameter value is percent-encoded by the URL builder.
pub fn build_authorize_url(provider: &ProviderConfig, state: &str, nonce: &str) -> String {
    let mut scopes: Vec<&str> = BASE_SCOPES.to_vec();
    if provider.preferred_username {
        scopes.push("preferred_username");
    }

    let mut url = Url::parse(&format!("{}/authorize", provider.base_url))
        .expect("FC_BASE_URL must be a valid URL");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("response_type", "code");
        pairs.append_pair("client_id", &provider.client_id);
        pairs.append_pair("redirect_uri", &provider.callback_uri());
        pairs.append_pair("scope", &scopes.join(" "));
        pairs.append_pair("state", state);
        pairs.append_pair("nonce", nonce);
        pairs.append_pair("acr_values", ACR_VALUES);
    }
    url.to_string()
}

/// Build the provider's logout URL, closing the provider-side session before
/// control returns to the local application.
pub fn build_logout_url(provider: &ProviderConfig, id_token: &str, state: &str) -> String {
    let mut url = Url::parse(&format!("{}/logout", provider.base_url))
        .expect("FC_BASE_URL must be a valid URL");
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("id_token_hint", id_token);
        pairs.append_pair("state", state);
        pairs.append_pair("post_logout_redirect_uri", &provider.logout_callback_uri());
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(preferred_username: bool) -> ProviderConfig {
        ProviderConfig {
            base_url: "https://fcp.integ01.dev-franceconnect.fr/api/v1".to_string(),
            client_id: "client123".to_string(),
            client_secret: "secret".to_string(),
            callback_base_url: "http://localhost:3000".to_string(),
            connection_ttl_secs: 300,
            preferred_username,
        }
    }

    #[test]
    fn authorize_url_carries_all_parameters() {
        let url = build_authorize_url(&provider(false), "state_xyz", "nonce_123");
        assert!(url.starts_with("https://fcp.integ01.dev-franceconnect.fr/api/v1/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client123"));
        assert!(url.contains("state=state_xyz"));
        assert!(url.contains("nonce=nonce_123"));
        assert!(url.contains("acr_values=eidas1"));
        assert!(!url.contains(' '), "URL must not contain literal spaces");
    }

    #[test]
    fn redirect_uri_is_percent_encoded() {
        let url = build_authorize_url(&provider(false), "s", "n");
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
    }

    #[test]
    fn preferred_username_scope_is_optional() {
        let with = build_authorize_url(&provider(true), "s", "n");
        let without = build_authorize_url(&provider(false), "s", "n");
        assert!(with.contains("preferred_username"));
        assert!(!without.contains("preferred_username"));
        assert!(without.contains("birthcountry"));
    }

    #[test]
    fn logout_url_echoes_state_and_token_hint() {
        let url = build_logout_url(&provider(false), "raw.jwt.here", "state_xyz");
        assert!(url.starts_with("https://fcp.integ01.dev-franceconnect.fr/api/v1/logout?"));
        assert!(url.contains("id_token_hint=raw.jwt.here"));
        assert!(url.contains("state=state_xyz"));
        assert!(url.contains(
            "post_logout_redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Flogout-callback"
        ));
    }

    #[test]
    fn random_tokens_are_distinct_and_url_safe() {
        let a = random_token();
        let b = random_token();
        assert_ne!(a, b);
        assert!(a
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '='));
    }
}
