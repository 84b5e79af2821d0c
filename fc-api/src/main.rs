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

//! France Connect relying-party backend entry point.
//!
//! A standalone Axum service handling the FC authorization-code flow:
//! authorize redirects, callback validation, and the logout round-trip.

use std::sync::Arc;

use fc_api::config::Config;
use fc_api::db::PgConnectionRepository;
use fc_api::routes;
use fc_api::state::{provider_http_client, AppState};
use fc_api::users::UserInfoResolver;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env().expect("failed to load configuration");

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to PostgreSQL");

    tracing::info!("Connected to PostgreSQL");

    let connections = Arc::new(PgConnectionRepository::new(
        pool,
        config.provider.connection_ttl_secs,
    ));
    let http = provider_http_client();
    let users = Arc::new(UserInfoResolver::new(http.clone(), config.provider.clone()));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState::new(connections, users, &config, http);
    let app = routes::router(&config.route_prefix)
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .expect("failed to bind listener");

    tracing::info!("FC backend listening on {}", config.listen_addr);

    axum::serve(listener, app).await.expect("server error");
}
