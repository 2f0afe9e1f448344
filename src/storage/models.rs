use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A disposable document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Serialized rich-text content
    pub content: String,
    /// When the document was created
    pub created_at: DateTime<Utc>,
    /// When the document stops being readable (None = never)
    pub expires_at: Option<DateTime<Utc>>,
    /// Opaque short identifier, also the share URL slug
    pub id: String,
    /// Last successful read
    pub last_accessed_at: Option<DateTime<Utc>>,
    /// Argon2 digest of the document password (None = unlocked)
    pub password_hash: Option<String>,
    /// When the password was set (set exactly once, never changed)
    pub password_set_at: Option<DateTime<Utc>>,
    /// Last content update
    pub updated_at: DateTime<Utc>,
    /// Monotonic count of successful reads
    pub view_count: u64,
}

impl Document {
    /// Whether the document is logically dead at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    /// Whether a password has been set.
    pub fn is_locked(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// When the account was registered
    pub created_at: DateTime<Utc>,
    /// Normalized (lower-cased, trimmed) email, unique
    pub email: String,
    /// Sequential integer identity
    pub id: u64,
    /// Argon2 digest of the account password
    pub password_hash: String,
}

/// A saved link belonging to one account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    /// Owning account
    pub account_id: u64,
    /// When the favorite was saved
    pub created_at: DateTime<Utc>,
    /// UUID identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Target URL as supplied by the client
    pub url: String,
}
