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

//! ID token signature verification.
//!
//! France Connect v1 signs ID tokens with the client secret (HMAC-SHA256),
//! so verification needs no key discovery: the shared secret is the key.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};

use super::claims::IdTokenClaims;

/// Why an ID token was rejected. Both variants are a 403 to the caller; they
/// are separated so the orchestrator can log them distinctly.
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// The token's `exp` has passed.
    Expired,
    /// Bad signature, wrong audience, malformed token, or any other
    /// validation failure.
    Invalid(String),
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Expired => write!(f, "token signature has expired"),
            VerifyError::Invalid(detail) => write!(f, "token validation failed: {detail}"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Verify an ID token's HS256 signature, audience, and expiry, returning the
/// decoded claims.
///
/// Nonce comparison is deliberately left to the caller: the expected nonce
/// lives on the Connection record, not in the validator.
pub fn verify_id_token(
    id_token: &str,
    secret: &str,
    audience: &str,
) -> Result<IdTokenClaims, VerifyError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    validation.validate_exp = true;

    let token_data = decode::<IdTokenClaims>(
        id_token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => VerifyError::Expired,
        _ => VerifyError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}
