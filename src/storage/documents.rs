use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Document;
use super::tables::*;

impl Database {
    // ========================================================================
    // Document operations
    // ========================================================================

    /// Store a document record (create or full overwrite)
    pub fn put_document(&self, document: &Document) -> Result<(), DatabaseError> {
        debug_assert!(!document.id.is_empty(), "document id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            let data = bincode::serialize(document)?;
            table.insert(document.id.as_str(), data.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get a document by ID
    pub fn get_document(&self, id: &str) -> Result<Option<Document>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(DOCUMENTS)?;

        match table.get(id)? {
            Some(data) => {
                let document: Document = bincode::deserialize(data.value())?;
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    /// Replace a document's content. Returns false if the document is gone.
    pub fn update_content(
        &self,
        id: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        self.mutate_document(id, |doc| {
            doc.content = content.to_string();
            doc.updated_at = now;
        })
    }

    /// Set the password hash, once. Returns `Ok(None)` if the document is
    /// gone and `Ok(Some(false))` if a hash is already present — the stored
    /// hash is left untouched in that case.
    pub fn set_password_hash(
        &self,
        id: &str,
        hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<bool>, DatabaseError> {
        let write_txn = self.begin_write()?;

        let existing: Option<Document> = {
            let table = write_txn.open_table(DOCUMENTS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(bincode::deserialize(data.value())?),
                None => None,
            };
            existing
        };

        let outcome = match existing {
            Some(mut doc) => {
                if doc.password_hash.is_some() {
                    Some(false)
                } else {
                    doc.password_hash = Some(hash.to_string());
                    doc.password_set_at = Some(now);
                    let data = bincode::serialize(&doc)?;
                    let mut table = write_txn.open_table(DOCUMENTS)?;
                    table.insert(id, data.as_slice())?;
                    Some(true)
                }
            }
            None => None,
        };

        write_txn.commit()?;
        Ok(outcome)
    }

    /// Set or clear the expiry timestamp. Returns false if the document is gone.
    pub fn set_expiry(
        &self,
        id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DatabaseError> {
        self.mutate_document(id, |doc| {
            doc.expires_at = expires_at;
        })
    }

    /// Bump the view counter and stamp last-accessed time
    pub fn increment_view_count(&self, id: &str, now: DateTime<Utc>) -> Result<bool, DatabaseError> {
        self.mutate_document(id, |doc| {
            doc.view_count += 1;
            doc.last_accessed_at = Some(now);
        })
    }

    /// Delete a document. Deleting an already-gone row is a no-op.
    pub fn delete_document(&self, id: &str) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            let deleted = table.remove(id)?.is_some();
            deleted
        };
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Delete every document whose expiry is at or before `now`.
    /// Used by the background sweep.
    pub fn delete_expired_documents(&self, now: DateTime<Utc>) -> Result<usize, DatabaseError> {
        // Phase 1: collect expired IDs under a read transaction
        let expired: Vec<String> = {
            let read_txn = self.begin_read()?;
            let table = read_txn.open_table(DOCUMENTS)?;
            let mut result = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let document: Document = bincode::deserialize(value.value())?;
                if document.is_expired_at(now) {
                    result.push(key.value().to_string());
                }
            }
            result
        };

        if expired.is_empty() {
            return Ok(0);
        }

        // Phase 2: delete them. Rows already removed by a racing lazy
        // delete simply come back as no-ops here.
        let write_txn = self.begin_write()?;
        let mut deleted = 0;
        {
            let mut table = write_txn.open_table(DOCUMENTS)?;
            for id in &expired {
                if table.remove(id.as_str())?.is_some() {
                    deleted += 1;
                }
            }
        }
        write_txn.commit()?;
        Ok(deleted)
    }

    /// Read-modify-write a single document inside one write transaction.
    fn mutate_document<F>(&self, id: &str, mutate: F) -> Result<bool, DatabaseError>
    where
        F: FnOnce(&mut Document),
    {
        let write_txn = self.begin_write()?;

        let existing: Option<Document> = {
            let table = write_txn.open_table(DOCUMENTS)?;
            let existing = match table.get(id)? {
                Some(data) => Some(bincode::deserialize(data.value())?),
                None => None,
            };
            existing
        };

        let found = match existing {
            Some(mut doc) => {
                mutate(&mut doc);
                let data = bincode::serialize(&doc)?;
                let mut table = write_txn.open_table(DOCUMENTS)?;
                table.insert(id, data.as_slice())?;
                true
            }
            None => false,
        };

        write_txn.commit()?;
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{make_document, setup_db};
    use chrono::{Duration, Utc};

    #[test]
    fn test_put_and_get_document() {
        let (db, _temp) = setup_db();

        let doc = make_document("d1");
        db.put_document(&doc).unwrap();

        let fetched = db.get_document("d1").unwrap().unwrap();
        assert_eq!(fetched.id, "d1");
        assert_eq!(fetched.view_count, 0);
        assert!(fetched.password_hash.is_none());
    }

    #[test]
    fn test_set_password_hash_only_once() {
        let (db, _temp) = setup_db();
        db.put_document(&make_document("d1")).unwrap();

        let now = Utc::now();
        assert_eq!(db.set_password_hash("d1", "hash-a", now).unwrap(), Some(true));
        assert_eq!(db.set_password_hash("d1", "hash-b", now).unwrap(), Some(false));

        // Original hash untouched
        let doc = db.get_document("d1").unwrap().unwrap();
        assert_eq!(doc.password_hash.as_deref(), Some("hash-a"));
    }

    #[test]
    fn test_set_password_hash_missing_document() {
        let (db, _temp) = setup_db();
        assert_eq!(db.set_password_hash("nope", "h", Utc::now()).unwrap(), None);
    }

    #[test]
    fn test_set_expiry_any_number_of_times() {
        let (db, _temp) = setup_db();
        db.put_document(&make_document("d1")).unwrap();

        let later = Utc::now() + Duration::hours(1);
        assert!(db.set_expiry("d1", Some(later)).unwrap());
        assert!(db.set_expiry("d1", None).unwrap());
        assert!(db.set_expiry("d1", Some(later)).unwrap());

        let doc = db.get_document("d1").unwrap().unwrap();
        assert_eq!(doc.expires_at, Some(later));
    }

    #[test]
    fn test_increment_view_count() {
        let (db, _temp) = setup_db();
        db.put_document(&make_document("d1")).unwrap();

        db.increment_view_count("d1", Utc::now()).unwrap();
        db.increment_view_count("d1", Utc::now()).unwrap();

        let doc = db.get_document("d1").unwrap().unwrap();
        assert_eq!(doc.view_count, 2);
        assert!(doc.last_accessed_at.is_some());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (db, _temp) = setup_db();
        db.put_document(&make_document("d1")).unwrap();

        assert!(db.delete_document("d1").unwrap());
        assert!(!db.delete_document("d1").unwrap());
    }

    #[test]
    fn test_delete_expired_documents() {
        let (db, _temp) = setup_db();
        let now = Utc::now();

        let mut live = make_document("live");
        live.expires_at = Some(now + Duration::hours(1));
        let mut dead = make_document("dead");
        dead.expires_at = Some(now - Duration::seconds(1));
        let forever = make_document("forever");

        db.put_document(&live).unwrap();
        db.put_document(&dead).unwrap();
        db.put_document(&forever).unwrap();

        assert_eq!(db.delete_expired_documents(now).unwrap(), 1);
        assert!(db.get_document("dead").unwrap().is_none());
        assert!(db.get_document("live").unwrap().is_some());
        assert!(db.get_document("forever").unwrap().is_some());
    }
}
