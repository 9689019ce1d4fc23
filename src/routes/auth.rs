// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity switching.
//!
//! Signing in points storage at the identity's documents; signing out
//! points it back at the local store. Both reload the collections from the
//! newly selected backend. Nothing is copied between backends.

use crate::error::Result;
use crate::identity::{verify_token, IdentityProvider};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/api/auth/session",
        post(sign_in).get(current_session).delete(sign_out),
    )
}

#[derive(Deserialize)]
struct SignInRequest {
    token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub authenticated: bool,
    pub identity: Option<String>,
}

impl SessionResponse {
    fn from_state(state: &AppState) -> Self {
        let identity = state.identity.current_identity();
        Self {
            authenticated: identity.is_some(),
            identity,
        }
    }
}

async fn current_session(State(state): State<Arc<AppState>>) -> Json<SessionResponse> {
    Json(SessionResponse::from_state(&state))
}

async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SignInRequest>,
) -> Result<Json<SessionResponse>> {
    let identity = verify_token(&body.token, &state.config.jwt_signing_key)?;
    state.identity.sign_in(identity);
    state.reload().await?;
    Ok(Json(SessionResponse::from_state(&state)))
}

async fn sign_out(State(state): State<Arc<AppState>>) -> Result<Json<SessionResponse>> {
    state.identity.sign_out();
    state.reload().await?;
    Ok(Json(SessionResponse::from_state(&state)))
}
