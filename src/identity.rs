// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current-identity tracking.
//!
//! The storage layer only asks "who is signed in right now?". Tokens are
//! HS256 JWTs whose subject is the identity id.

use crate::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Source of the currently authenticated identity.
///
/// Consulted on every storage call; implementations must not cache
/// decisions on behalf of the caller.
pub trait IdentityProvider: Send + Sync {
    /// Id of the signed-in identity, if any.
    fn current_identity(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }
}

/// Provider that never has an identity (always local storage).
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl IdentityProvider for Anonymous {
    fn current_identity(&self) -> Option<String> {
        None
    }
}

/// Process-wide identity that can be switched at runtime.
#[derive(Debug, Default)]
pub struct SessionIdentity {
    current: RwLock<Option<String>>,
}

impl SessionIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to `identity`. Previously written data stays where it was.
    pub fn sign_in(&self, identity: impl Into<String>) {
        let identity = identity.into();
        tracing::info!(identity = %identity, "Identity signed in");
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = Some(identity);
    }

    /// Drop the current identity; subsequent calls use local storage.
    pub fn sign_out(&self) {
        let previous = self
            .current
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(identity) = previous {
            tracing::info!(identity = %identity, "Identity signed out");
        }
    }
}

impl IdentityProvider for SessionIdentity {
    fn current_identity(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Verify an identity token and return its subject.
pub fn verify_token(token: &str, signing_key: &[u8]) -> Result<String, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected identity token");
        AppError::InvalidToken
    })?;

    let subject = token_data.claims.sub.trim();
    if subject.is_empty() {
        return Err(AppError::InvalidToken);
    }
    Ok(subject.to_string())
}

/// Create a JWT for an identity.
pub fn create_jwt(identity: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: identity.to_string(),
        iat: now,
        exp: now + 30 * 24 * 60 * 60, // 30 days
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
