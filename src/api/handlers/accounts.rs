use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::account_error;
use crate::api::middleware::{AuthSession, SESSION_COOKIE};
use crate::api::response::{ApiError, AppJson, JSend};
use crate::auth::accounts;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub created_at: String,
    pub email: String,
    pub id: u64,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<JSend<AccountResponse>>), ApiError> {
    let db = state.db.clone();
    let min_length = state.config.sessions.min_password_length;

    let account = tokio::task::spawn_blocking(move || {
        accounts::register(&db, &req.email, &req.password, min_length)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))?
    .map_err(account_error)?;

    let jar = jar.add(session_cookie(&state, account.id));
    Ok((
        jar,
        JSend::success(AccountResponse {
            created_at: account.created_at.to_rfc3339(),
            email: account.email,
            id: account.id,
        }),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    AppJson(req): AppJson<CredentialsRequest>,
) -> Result<(CookieJar, Json<JSend<AccountResponse>>), ApiError> {
    let db = state.db.clone();

    let account =
        tokio::task::spawn_blocking(move || accounts::login(&db, &req.email, &req.password))
            .await
            .map_err(|e| ApiError::internal(e.to_string()))?
            .map_err(account_error)?;

    let jar = jar.add(session_cookie(&state, account.id));
    Ok((
        jar,
        JSend::success(AccountResponse {
            created_at: account.created_at.to_rfc3339(),
            email: account.email,
            id: account.id,
        }),
    ))
}

/// Logout discards the client's cookie; there is no server-side session
/// state to revoke.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<JSend<()>>) {
    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), JSend::success(()))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthSession(claim): AuthSession,
) -> Result<Json<JSend<AccountResponse>>, ApiError> {
    let account = state
        .db
        .get_account(claim.account_id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::unauthorized("Unknown account", "session"))?;

    Ok(JSend::success(AccountResponse {
        created_at: account.created_at.to_rfc3339(),
        email: account.email,
        id: account.id,
    }))
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the session cookie: HTTP-only, SameSite=Lax, path `/`, max-age
/// equal to the token TTL, Secure when configured.
fn session_cookie(state: &AppState, account_id: u64) -> Cookie<'static> {
    let token = state.sessions.issue(account_id, Utc::now());
    let ttl = state.sessions.ttl_seconds();

    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_secure(state.config.sessions.secure_cookies);
    cookie.set_max_age(time::Duration::seconds(ttl as i64));
    cookie
}
