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

//! ID token claim set.

use serde::{Deserialize, Serialize};

/// Claims carried by a France Connect ID token.
///
/// `aud` can be a single string or an array per the OIDC spec; the raw value
/// is captured and matched against the client id during validation.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdTokenClaims {
    /// Subject identifier: the provider's stable key for the citizen.
    pub sub: String,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    #[serde(default)]
    pub iat: Option<i64>,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
}
