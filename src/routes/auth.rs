// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and login routes.
//!
//! Logout is purely client-side: the server keeps no session.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Credentials, LoginResponse, RegisterResponse};
use crate::routes::ApiJson;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
}

/// Create an account.
async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<(StatusCode, ApiJson<RegisterResponse>)> {
    let user = state.identity.register(&credentials).await?;

    Ok((
        StatusCode::CREATED,
        ApiJson(RegisterResponse {
            message: "User created successfully".to_string(),
            username: user.username,
        }),
    ))
}

/// Check credentials and return the user's identity.
async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(credentials): ApiJson<Credentials>,
) -> Result<ApiJson<LoginResponse>> {
    let user = state.identity.login(&credentials).await?;

    tracing::info!(user_id = user.id, username = %user.username, "Login successful");

    Ok(ApiJson(LoginResponse {
        message: "Login successful".to_string(),
        username: user.username,
        user_id: user.id,
    }))
}
