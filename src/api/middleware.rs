//! Session extraction and creation throttling.
//!
//! `AuthSession` resolves the signed session cookie to an identity claim —
//! pure MAC verification, no session table, no I/O. `limit_creation` is
//! applied only to the document-creation route.

use axum::{
    body::Body,
    extract::{ConnectInfo, FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::auth::SessionClaim;
use crate::AppState;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "driftpad_session";

/// An authenticated session, extracted from the signed cookie.
/// Rejects with 401 when the cookie is missing, tampered, or past its TTL.
pub struct AuthSession(pub SessionClaim);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let claim = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.sessions.verify(cookie.value(), Utc::now()));

        match claim {
            Some(claim) => Ok(AuthSession(claim)),
            None => Err(ApiError::unauthorized(
                "Authentication required",
                "session",
            )),
        }
    }
}

/// Middleware that throttles document creation per client network identity.
pub async fn limit_creation(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_identity(&request);

    match state.rate_limiter.try_acquire(&client) {
        Ok(()) => next.run(request).await,
        Err(retry_after_seconds) => {
            tracing::debug!(client = %client, retry_after_seconds, "Creation rate limit tripped");
            ApiError::RateLimited {
                retry_after_seconds,
            }
            .into_response()
        }
    }
}

/// Best client identity available: the first X-Forwarded-For hop when
/// behind a proxy, otherwise the peer address.
fn client_identity(request: &Request<Body>) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
