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

//! France Connect OIDC helpers: authorize/logout URL construction,
//! authorization-code token exchange, and ID token verification.

pub mod authorize;
pub mod claims;
pub mod exchange;
pub mod verify;

pub use authorize::{build_authorize_url, build_logout_url, random_token};
pub use claims::IdTokenClaims;
pub use exchange::{exchange_code, ExchangeError, TokenResponse};
pub use verify::verify_id_token;
