//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use chrono::Utc;
use tempfile::TempDir;

use crate::storage::models::{Document, Favorite};
use crate::storage::Database;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// Create an unlocked, never-expiring document with the given id.
pub fn make_document(id: &str) -> Document {
    let now = Utc::now();
    Document {
        content: String::new(),
        created_at: now,
        expires_at: None,
        id: id.to_string(),
        last_accessed_at: None,
        password_hash: None,
        password_set_at: None,
        updated_at: now,
        view_count: 0,
    }
}

/// Create a favorite with the given id, owner, and URL.
pub fn make_favorite(id: &str, account_id: u64, url: &str) -> Favorite {
    Favorite {
        account_id,
        created_at: Utc::now(),
        id: id.to_string(),
        title: format!("title-{id}"),
        url: url.to_string(),
    }
}
