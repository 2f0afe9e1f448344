//! Document lifecycle: creation, guarded reads and writes, the set-once
//! password, and expiry handling.

pub mod expiry;
pub mod guard;

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use thiserror::Error;

use crate::auth::password::{hash_password, PasswordError};
use crate::storage::models::Document;
use crate::storage::Database;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Content exceeds the maximum size of {limit} bytes")]
    ContentTooLarge { limit: usize },
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("Document has expired")]
    Expired,
    #[error("Password hashing failed: {0}")]
    Hash(#[from] PasswordError),
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Document not found")]
    NotFound,
    #[error("Document password is already set")]
    PasswordAlreadySet,
    #[error("Password is required")]
    PasswordRequired,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}

/// Generate a collision-resistant random document ID (alphanumeric)
pub fn generate_document_id(length: usize) -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Create an empty document and return it.
pub fn create(db: &Database, id_length: usize) -> Result<Document, DocumentError> {
    let now = Utc::now();

    // IDs are random enough that collisions are vanishingly rare, but a
    // collision must never overwrite someone else's document.
    let mut id = generate_document_id(id_length);
    while db.get_document(&id)?.is_some() {
        id = generate_document_id(id_length);
    }

    let document = Document {
        content: String::new(),
        created_at: now,
        expires_at: None,
        id,
        last_accessed_at: None,
        password_hash: None,
        password_set_at: None,
        updated_at: now,
        view_count: 0,
    };

    db.put_document(&document)?;
    tracing::debug!(document_id = %document.id, "Created document");
    Ok(document)
}

/// Load a document, applying the lazy expiry check.
///
/// An expired document is deleted on the spot so a racing second request
/// observes not-found instead of stale content.
pub fn fetch_live(db: &Database, id: &str) -> Result<Document, DocumentError> {
    let document = db.get_document(id)?.ok_or(DocumentError::NotFound)?;

    if document.is_expired_at(Utc::now()) {
        // Racing deletes of an already-gone row are no-ops
        if let Err(e) = db.delete_document(id) {
            tracing::warn!(error = %e, document_id = %id, "Failed to delete expired document");
        }
        tracing::debug!(document_id = %id, "Document expired on access");
        return Err(DocumentError::Expired);
    }

    Ok(document)
}

/// Guarded read. Increments the view counter as a side effect; counter
/// failures are logged, never surfaced — the read itself already succeeded.
pub fn read(
    db: &Database,
    id: &str,
    credential: Option<&str>,
) -> Result<Document, DocumentError> {
    let document = fetch_live(db, id)?;
    guard::authorize(&document, credential)?;

    if let Err(e) = db.increment_view_count(id, Utc::now()) {
        tracing::warn!(error = %e, document_id = %id, "Failed to bump view counter");
    }

    Ok(document)
}

/// Guarded content update. Last write wins for concurrent updates.
pub fn update_content(
    db: &Database,
    id: &str,
    content: &str,
    credential: Option<&str>,
    max_content_bytes: usize,
) -> Result<(), DocumentError> {
    if content.len() > max_content_bytes {
        return Err(DocumentError::ContentTooLarge {
            limit: max_content_bytes,
        });
    }

    let document = fetch_live(db, id)?;
    guard::authorize(&document, credential)?;

    if !db.update_content(id, content, Utc::now())? {
        // Deleted between the check and the write
        return Err(DocumentError::NotFound);
    }

    tracing::debug!(document_id = %id, bytes = content.len(), "Updated document content");
    Ok(())
}

/// Set the document password. Allowed exactly once: a second attempt fails
/// with `PasswordAlreadySet` and the stored hash is unchanged.
pub fn set_password(
    db: &Database,
    id: &str,
    password: &str,
    min_password_length: usize,
) -> Result<(), DocumentError> {
    let document = fetch_live(db, id)?;
    if document.is_locked() {
        return Err(DocumentError::PasswordAlreadySet);
    }
    if password.len() < min_password_length {
        return Err(DocumentError::PasswordTooShort(min_password_length));
    }

    let digest = hash_password(password)?;
    match db.set_password_hash(id, &digest, Utc::now())? {
        Some(true) => {
            tracing::debug!(document_id = %id, "Document password set");
            Ok(())
        }
        // Lost a race against another set-password call
        Some(false) => Err(DocumentError::PasswordAlreadySet),
        None => Err(DocumentError::NotFound),
    }
}

/// Set or clear the expiry timestamp. Unlike the password this may change
/// any number of times; a past instant is accepted and simply makes the
/// document expired on its next check.
pub fn set_expiry(
    db: &Database,
    id: &str,
    expires_at: Option<DateTime<Utc>>,
    credential: Option<&str>,
) -> Result<(), DocumentError> {
    let document = fetch_live(db, id)?;
    guard::authorize(&document, credential)?;

    if !db.set_expiry(id, expires_at)? {
        return Err(DocumentError::NotFound);
    }

    tracing::debug!(document_id = %id, expires_at = ?expires_at, "Set document expiry");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::setup_db;
    use chrono::Duration;

    #[test]
    fn test_generate_document_id() {
        let id = generate_document_id(10);
        assert_eq!(id.len(), 10);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));

        // Ensure randomness
        assert_ne!(id, generate_document_id(10));
    }

    #[test]
    fn test_create_starts_empty_and_unlocked() {
        let (db, _temp) = setup_db();

        let doc = create(&db, 10).unwrap();
        assert!(doc.content.is_empty());
        assert!(!doc.is_locked());
        assert!(doc.expires_at.is_none());
        assert!(db.get_document(&doc.id).unwrap().is_some());
    }

    #[test]
    fn test_read_bumps_view_count() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();

        read(&db, &doc.id, None).unwrap();
        read(&db, &doc.id, None).unwrap();

        let stored = db.get_document(&doc.id).unwrap().unwrap();
        assert_eq!(stored.view_count, 2);
    }

    #[test]
    fn test_read_missing_document() {
        let (db, _temp) = setup_db();
        assert!(matches!(
            read(&db, "missing", None),
            Err(DocumentError::NotFound)
        ));
    }

    #[test]
    fn test_expired_read_then_not_found() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();

        set_expiry(&db, &doc.id, Some(Utc::now() - Duration::seconds(1)), None).unwrap();

        // First touch reports expired and deletes the row
        assert!(matches!(read(&db, &doc.id, None), Err(DocumentError::Expired)));
        // The record is gone afterwards
        assert!(matches!(read(&db, &doc.id, None), Err(DocumentError::NotFound)));
    }

    #[test]
    fn test_update_content_too_large() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();

        let err = update_content(&db, &doc.id, "0123456789", None, 8).unwrap_err();
        assert!(matches!(err, DocumentError::ContentTooLarge { limit: 8 }));

        // Content unchanged
        let stored = db.get_document(&doc.id).unwrap().unwrap();
        assert!(stored.content.is_empty());
    }

    #[test]
    fn test_set_password_once() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();

        set_password(&db, &doc.id, "abcd", 4).unwrap();
        assert!(matches!(
            set_password(&db, &doc.id, "efgh", 4),
            Err(DocumentError::PasswordAlreadySet)
        ));

        // Original password still works
        assert!(read(&db, &doc.id, Some("abcd")).is_ok());
    }

    #[test]
    fn test_set_password_too_short() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();

        assert!(matches!(
            set_password(&db, &doc.id, "abc", 4),
            Err(DocumentError::PasswordTooShort(4))
        ));
        assert!(!db.get_document(&doc.id).unwrap().unwrap().is_locked());
    }

    #[test]
    fn test_locked_document_guards_read_and_write() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();
        set_password(&db, &doc.id, "abcd", 4).unwrap();

        assert!(matches!(
            read(&db, &doc.id, None),
            Err(DocumentError::PasswordRequired)
        ));
        assert!(matches!(
            read(&db, &doc.id, Some("wrong")),
            Err(DocumentError::InvalidPassword)
        ));
        assert!(read(&db, &doc.id, Some("abcd")).is_ok());

        assert!(matches!(
            update_content(&db, &doc.id, "hi", None, 1024),
            Err(DocumentError::PasswordRequired)
        ));
        assert!(update_content(&db, &doc.id, "hi", Some("abcd"), 1024).is_ok());
    }

    #[test]
    fn test_set_expiry_clears_to_never() {
        let (db, _temp) = setup_db();
        let doc = create(&db, 10).unwrap();

        set_expiry(&db, &doc.id, Some(Utc::now() + Duration::hours(1)), None).unwrap();
        set_expiry(&db, &doc.id, None, None).unwrap();

        let stored = db.get_document(&doc.id).unwrap().unwrap();
        assert!(stored.expires_at.is_none());
    }
}
