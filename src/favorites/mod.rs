//! Server-side favorites and the one-time local → server merge.
//!
//! Anonymous favorites live only in the client's local storage until the
//! first authenticated load, when they are merged into the account's set,
//! deduplicated by normalized URL. The merge leaves already-uploaded items
//! in place on partial failure, so a client retry is safe: duplicates are
//! simply re-skipped.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::storage::models::Favorite;
use crate::storage::Database;

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("Favorite not found")]
    NotFound,
}

/// A favorite held in the client's anonymous local storage
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalFavorite {
    #[serde(default)]
    pub title: String,
    pub url: String,
}

/// Outcome of merging local favorites into an account's set
#[derive(Debug, Default, Serialize)]
pub struct MergeReport {
    pub created: usize,
    pub skipped: usize,
}

/// Canonicalize a URL for dedup: lower-cased scheme and host, default port
/// stripped, trailing slash stripped unless the path is just `/`, fragment
/// dropped. Unparseable URLs fall back to trimmed verbatim comparison.
pub fn normalize_url(raw: &str) -> String {
    let parsed = match Url::parse(raw.trim()) {
        Ok(url) => url,
        Err(_) => return raw.trim().to_string(),
    };

    let scheme = parsed.scheme();
    let host = parsed.host_str().unwrap_or_default();
    let port = match parsed.port() {
        // Url::port already hides scheme-default ports
        Some(port) => format!(":{port}"),
        None => String::new(),
    };

    let mut path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    let query = match parsed.query() {
        Some(q) => format!("?{q}"),
        None => String::new(),
    };

    format!("{scheme}://{host}{port}{path}{query}")
}

/// Save a favorite for an account.
pub fn add(
    db: &Database,
    account_id: u64,
    url: &str,
    title: &str,
) -> Result<Favorite, FavoriteError> {
    let favorite = Favorite {
        account_id,
        created_at: Utc::now(),
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        url: url.to_string(),
    };

    db.put_favorite(&favorite)?;
    tracing::debug!(favorite_id = %favorite.id, account_id, "Saved favorite");
    Ok(favorite)
}

/// List an account's favorites.
pub fn list(db: &Database, account_id: u64) -> Result<Vec<Favorite>, FavoriteError> {
    Ok(db.get_favorites_by_account(account_id)?)
}

/// Delete one of the account's own favorites.
pub fn remove(db: &Database, account_id: u64, favorite_id: &str) -> Result<(), FavoriteError> {
    if !db.delete_favorite_for_account(account_id, favorite_id)? {
        return Err(FavoriteError::NotFound);
    }
    tracing::debug!(favorite_id = %favorite_id, account_id, "Deleted favorite");
    Ok(())
}

/// Merge the client's anonymous local favorites into the account's set.
///
/// Each local item is created server-side unless a favorite with the same
/// normalized URL already exists. A storage error aborts mid-batch with
/// everything created so far left in place; the client keeps its local copy
/// and retries, at which point the created items dedup as skips.
pub fn merge_local(
    db: &Database,
    account_id: u64,
    local: Vec<LocalFavorite>,
) -> Result<MergeReport, FavoriteError> {
    let mut known: Vec<String> = db
        .get_favorites_by_account(account_id)?
        .iter()
        .map(|f| normalize_url(&f.url))
        .collect();

    let mut report = MergeReport::default();
    for item in local {
        let normalized = normalize_url(&item.url);
        if known.contains(&normalized) {
            report.skipped += 1;
            continue;
        }

        add(db, account_id, &item.url, &item.title)?;
        known.push(normalized);
        report.created += 1;
    }

    tracing::debug!(
        account_id,
        created = report.created,
        skipped = report.skipped,
        "Merged local favorites"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::setup_db;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("HTTP://X.com/a/"), "http://x.com/a");
        assert_eq!(normalize_url("http://x.com"), "http://x.com/");
        assert_eq!(normalize_url("http://x.com/"), "http://x.com/");
        assert_eq!(normalize_url("http://x.com:80/a"), "http://x.com/a");
        assert_eq!(normalize_url("http://x.com:8080/a"), "http://x.com:8080/a");
        assert_eq!(normalize_url("http://x.com/a#frag"), "http://x.com/a");
        assert_eq!(normalize_url("http://x.com/a?b=1"), "http://x.com/a?b=1");
        // Unparseable input compares verbatim
        assert_eq!(normalize_url("  not a url  "), "not a url");
    }

    #[test]
    fn test_merge_dedups_by_normalized_url() {
        let (db, _temp) = setup_db();

        // Same URL after normalization
        let local = vec![
            LocalFavorite {
                title: "a".to_string(),
                url: "http://x/a".to_string(),
            },
            LocalFavorite {
                title: "a again".to_string(),
                url: "http://x/a/".to_string(),
            },
        ];

        let report = merge_local(&db, 1, local).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(list(&db, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_merge_skips_existing_server_favorites() {
        let (db, _temp) = setup_db();

        add(&db, 1, "http://x/a", "existing").unwrap();

        let local = vec![
            LocalFavorite {
                title: String::new(),
                url: "http://x/a/".to_string(),
            },
            LocalFavorite {
                title: String::new(),
                url: "http://x/b".to_string(),
            },
        ];

        let report = merge_local(&db, 1, local).unwrap();
        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(list(&db, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_merge_retry_is_idempotent() {
        let (db, _temp) = setup_db();

        let local = vec![LocalFavorite {
            title: String::new(),
            url: "http://x/a".to_string(),
        }];

        merge_local(&db, 1, local.clone()).unwrap();
        // Client kept its local copy (e.g. transient failure before it saw
        // the response) and retries the whole batch
        let report = merge_local(&db, 1, local).unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(list(&db, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_unknown_favorite() {
        let (db, _temp) = setup_db();
        assert!(matches!(
            remove(&db, 1, "missing"),
            Err(FavoriteError::NotFound)
        ));
    }
}
