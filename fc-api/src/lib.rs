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

//! France Connect relying-party backend library.
//!
//! This crate provides the Axum router, application state, and configuration
//! for the France Connect (FC) authorization-code flow: outbound authorize
//! redirects, callback handling, token exchange, ID token validation, and the
//! provider logout round-trip. The binary entry point (`main.rs`) is a thin
//! wrapper that calls into this library.

pub mod config;
pub mod db;
pub mod error;
pub mod oidc;
pub mod routes;
pub mod session;
pub mod state;
pub mod users;
