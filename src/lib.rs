//! driftpad - A disposable-document sharing service
//!
//! Short-lived documents shared by URL, with:
//! - Optional set-once document passwords (Argon2)
//! - Optional expiry, enforced lazily on access and by a background sweep
//! - Stateless HMAC-signed session cookies (no server-side session table)
//! - Per-client creation rate limiting
//! - Server-side favorites with a one-time local merge
//! - redb embedded database (ACID, MVCC, crash-safe)
//! - REST API

pub mod api;
pub mod auth;
pub mod config;
pub mod documents;
pub mod favorites;
pub mod ratelimit;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use auth::SessionCodec;
use config::Config;
use ratelimit::RateLimiter;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub rate_limiter: RateLimiter,
    pub sessions: SessionCodec,
}
