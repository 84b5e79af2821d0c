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

//! Integration tests for authorization initiation.


use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use fc_api::db::{ConnectionRepository, InMemoryConnectionRepository};
use test_helpers::*;
use tower::ServiceExt;

const PROVIDER_BASE: &str = "http://127.0.0.1:9";

fn authorize_request(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri("/fc_authorize/");
    if let Some(value) = cookie {
        builder = builder.header("Cookie", value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn authorize_fills_connection_and_redirects_to_provider() {
    let repo = Arc::new(InMemoryConnectionRepository::new(TEST_TTL_SECS));
    let created = repo.create().await.unwrap();
    assert!(created.state.is_empty());

    let app = build_app(repo.clone(), StaticResolver::new("123"), PROVIDER_BASE);
    let resp = app
        .oneshot(authorize_request(Some(&format!("connection={}", created.id))))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let loc = location(&resp);
    assert!(loc.starts_with(&format!("{PROVIDER_BASE}/authorize?")));
    assert!(loc.contains("response_type=code"));
    assert!(loc.contains(&format!("client_id={TEST_CLIENT_ID}")));
    assert!(loc.contains("acr_values=eidas1"));

    let connection = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert!(!connection.state.is_empty());
    assert!(!connection.nonce.is_empty());
    assert!(loc.contains(&format!("state={}", connection.state)));
    assert!(loc.contains(&format!("nonce={}", connection.nonce)));
}

#[tokio::test]
async fn authorize_without_session_cookie_is_forbidden() {
    let repo = Arc::new(InMemoryConnectionRepository::new(TEST_TTL_SECS));
    let app = build_app(repo, StaticResolver::new("123"), PROVIDER_BASE);

    let resp = app.oneshot(authorize_request(None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn authorize_with_unknown_connection_id_is_forbidden() {
    let repo = Arc::new(InMemoryConnectionRepository::new(TEST_TTL_SECS));
    let app = build_app(repo, StaticResolver::new("123"), PROVIDER_BASE);

    let resp = app
        .oneshot(authorize_request(Some("connection=999")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn routes_mount_under_configured_prefix() {
    let repo = Arc::new(InMemoryConnectionRepository::new(TEST_TTL_SECS));
    let created = repo.create().await.unwrap();
    let cookie = format!("connection={}", created.id);
    let app = build_prefixed_app(
        repo,
        StaticResolver::new("123"),
        PROVIDER_BASE,
        "fc",
    );

    // Prefixed paths resolve.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/fc/fc_authorize/")
                .header("Cookie", &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/fc/callback/?state=unknown&code=c")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The unprefixed paths no longer exist.
    let resp = app
        .oneshot(authorize_request(Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reinitiation_invalidates_the_previous_state_pair() {
    let repo = Arc::new(InMemoryConnectionRepository::new(TEST_TTL_SECS));
    let created = repo.create().await.unwrap();
    let cookie = format!("connection={}", created.id);

    let app = build_app(repo.clone(), StaticResolver::new("123"), PROVIDER_BASE);
    app.clone()
        .oneshot(authorize_request(Some(&cookie)))
        .await
        .unwrap();
    let first = repo.find_by_id(created.id).await.unwrap().unwrap();

    app.oneshot(authorize_request(Some(&cookie))).await.unwrap();
    let second = repo.find_by_id(created.id).await.unwrap().unwrap();

    assert_ne!(first.state, second.state);
    assert_ne!(first.nonce, second.nonce);

    // Only the latest pair resolves; the old state is gone.
    assert!(repo.find_by_state(&first.state).await.unwrap().is_none());
    assert!(repo
        .find_by_state(&second.state)
        .await
        .unwrap()
        .is_some());
}
