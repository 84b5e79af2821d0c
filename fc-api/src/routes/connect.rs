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

//! France Connect route handlers: outbound authorize redirect and the
//! callback orchestrator.
//!
//! The callback walks the authorization-code exchange in a fixed order,
//! short-circuiting on the first failure: state lookup, expiry check, code
//! presence, token exchange, ID token validation, nonce comparison, a second
//! expiry check, user resolution, and finally the provider logout redirect
//! (France Connect requires a logout round-trip to clear its own session
//! before control returns to the relying application).

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use url::form_urlencoded;

use crate::db::ConnectionType;
use crate::error::AppError;
use crate::oidc;
use crate::oidc::verify::VerifyError;
use crate::session::ConnectionSession;
use crate::state::AppState;

/// Generic retry message for recoverable provider failures. The real
/// diagnostic goes to the server log only.
const PROVIDER_ERROR_NOTICE: &str =
    "We hit a temporary problem while talking to France Connect. Please try again.";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

/// GET /fc_authorize/
///
/// Rewrites the session's Connection with a fresh state/nonce pair (any
/// outstanding authorization attempt for that Connection becomes unusable)
/// and redirects the browser to the provider's authorize endpoint.
pub async fn fc_authorize(
    State(state): State<AppState>,
    ConnectionSession(connection_id): ConnectionSession,
) -> Result<Response, AppError> {
    let mut connection = state
        .connections
        .find_by_id(connection_id)
        .await?
        .ok_or_else(|| {
            tracing::info!("403: no connection with id {connection_id}");
            AppError::forbidden()
        })?;

    connection.state = oidc::random_token();
    connection.nonce = oidc::random_token();
    connection.connection_type = ConnectionType::Fs;
    state.connections.save(&connection).await?;

    let authorize_url =
        oidc::build_authorize_url(&state.provider, &connection.state, &connection.nonce);
    Ok(Redirect::to(&authorize_url).into_response())
}

/// GET /callback/?state=...&code=...
///
/// The callback orchestrator. Answers one of: 302 to the provider's logout
/// endpoint (success), 302 to a local fallback page (recoverable upstream
/// failure), 403 (protocol or security check failure), 408 (Connection
/// expired).
pub async fn fc_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    // 1. Resolve the Connection by state token.
    let Some(state_token) = query.state.as_deref() else {
        tracing::info!("403: no state has been provided");
        return Err(AppError::forbidden());
    };
    let Some(mut connection) = state.connections.find_by_state(state_token).await? else {
        tracing::info!("403: this state does not seem to exist: {state_token}");
        return Err(AppError::forbidden());
    };

    // 2. Honor the TTL before any network call.
    if connection.is_expired(chrono::Utc::now()) {
        tracing::info!("408: FC connection has expired");
        return Err(AppError::connection_expired());
    }

    // 3. The provider must have sent an authorization code.
    let Some(code) = query.code.as_deref() else {
        tracing::info!("403: no code has been provided");
        return Err(AppError::forbidden());
    };

    // 4. Exchange the code for tokens. Upstream trouble is recoverable: log
    //    the full diagnostic, send the user to a retry page.
    let token_response = match oidc::exchange_code(&state.http, &state.provider, code).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("{err}");
            return Ok(redirect_with_notice(&state.retry_url, PROVIDER_ERROR_NOTICE));
        }
    };

    // 5. The exchange succeeded even if the ID token fails validation below,
    //    so persist the access token now.
    connection.access_token = Some(token_response.access_token.clone());
    state.connections.save(&connection).await?;

    let Some(id_token) = token_response.id_token.as_deref() else {
        tracing::info!("403: token response carried no id_token");
        return Err(AppError::forbidden());
    };

    // 6. Validate signature, audience, and expiry.
    let claims = oidc::verify_id_token(
        id_token,
        &state.provider.client_secret,
        &state.provider.client_id,
    )
    .map_err(|err| {
        match err {
            VerifyError::Expired => tracing::info!("403: token signature has expired"),
            VerifyError::Invalid(detail) => tracing::info!("403: invalid id_token: {detail}"),
        }
        AppError::forbidden()
    })?;

    // 7. The nonce must be the one sent at authorization time.
    if claims.nonce.as_deref() != Some(connection.nonce.as_str()) {
        tracing::info!("403: the nonce is different than the one expected");
        return Err(AppError::forbidden());
    }

    // 8. The provider round-trip takes real time; honor the TTL at the point
    //    of use, not just at lookup.
    if connection.is_expired(chrono::Utc::now()) {
        tracing::info!("408: FC connection has expired");
        return Err(AppError::connection_expired());
    }

    // 9. Reconcile the identity with a local user record.
    let identity = match state.users.resolve_user(&connection).await {
        Ok(identity) => identity,
        Err(err) => {
            return Ok(redirect_with_notice(&state.home_url, &err.message));
        }
    };

    // 10. Finalize and send the browser through the provider's logout.
    connection.user_sub = Some(identity.sub);
    state.connections.save(&connection).await?;

    let logout_url = oidc::build_logout_url(&state.provider, id_token, state_token);
    Ok(Redirect::to(&logout_url).into_response())
}

/// Redirect to a local page with a user-displayable `notice` query parameter.
fn redirect_with_notice(url: &str, notice: &str) -> Response {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("notice", notice)
        .finish();
    let separator = if url.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{url}{separator}{query}")).into_response()
}
