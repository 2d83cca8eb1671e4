//! Session gate.
//!
//! The page never reaches for ambient session state: handlers resolve a
//! [`SessionContext`] per request and hand it to the render selector.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use tracing::warn;

use crate::state::AppState;
use crate::storage::Storage;

/// Read-only session signals for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    is_loading: bool,
    is_authenticated: bool,
    storage_ready: bool,
}

impl SessionContext {
    pub fn new(is_loading: bool, is_authenticated: bool, storage_ready: bool) -> Self {
        Self {
            is_loading,
            is_authenticated,
            storage_ready,
        }
    }

    /// Session resolution has not finished.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn storage_ready(&self) -> bool {
        self.storage_ready
    }
}

#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: Option<&str>) -> SessionContext;
}

pub fn session_key(token: &str) -> String {
    format!("session:{token}")
}

/// Treats a token as signed in when the auth flow has left a
/// `session:<token>` marker in the key-value store.
pub struct KvSessionResolver {
    storage: Storage,
}

impl KvSessionResolver {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl SessionResolver for KvSessionResolver {
    async fn resolve(&self, token: Option<&str>) -> SessionContext {
        if !self.storage.is_ready() {
            return SessionContext::new(true, false, false);
        }
        let Some(token) = token else {
            return SessionContext::new(false, false, true);
        };
        match self.storage.kv().get(&session_key(token)).await {
            Ok(marker) => SessionContext::new(false, marker.is_some(), true),
            Err(e) => {
                // Unknown rather than signed out: keep the login prompt hidden.
                warn!("Session lookup failed: {e}");
                SessionContext::new(true, false, true)
            }
        }
    }
}

/// The requesting viewer: their token (if any) and resolved session.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub token: Option<String>,
    pub session: SessionContext,
}

impl Viewer {
    /// Token of a signed-in viewer; pages and blobs are keyed by it.
    pub fn signed_in_token(&self) -> Option<&str> {
        if self.session.is_authenticated() {
            self.token.as_deref()
        } else {
            None
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers, &state.session_cookie);
        let session = state.sessions.resolve(token.as_deref()).await;
        Ok(Viewer { token, session })
    }
}

/// Session token from the session cookie, falling back to a bearer header.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string());

    from_cookie
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(|t| t.trim().to_string())
        })
        .filter(|t| !t.is_empty())
}
