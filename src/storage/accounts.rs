use chrono::{DateTime, Utc};
use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Account;
use super::tables::*;

const NEXT_ACCOUNT_ID: &str = "next_account_id";

impl Database {
    // ========================================================================
    // Account operations
    // ========================================================================

    /// Create an account with the given normalized email. Returns `None`
    /// when the email is already taken.
    pub fn create_account(
        &self,
        email: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, DatabaseError> {
        debug_assert_eq!(email, email.trim().to_lowercase(), "email must be normalized");

        let write_txn = self.begin_write()?;

        let taken = {
            let emails = write_txn.open_table(ACCOUNT_EMAILS)?;
            let taken = emails.get(email)?.is_some();
            taken
        };

        let account = if taken {
            None
        } else {
            let id = {
                let mut meta = write_txn.open_table(META)?;
                let next = meta.get(NEXT_ACCOUNT_ID)?.map(|v| v.value()).unwrap_or(1);
                meta.insert(NEXT_ACCOUNT_ID, next + 1)?;
                next
            };

            let account = Account {
                created_at: now,
                email: email.to_string(),
                id,
                password_hash: password_hash.to_string(),
            };

            {
                let mut table = write_txn.open_table(ACCOUNTS)?;
                let data = bincode::serialize(&account)?;
                table.insert(account.id, data.as_slice())?;
            }
            {
                let mut emails = write_txn.open_table(ACCOUNT_EMAILS)?;
                emails.insert(email, account.id)?;
            }

            Some(account)
        };

        write_txn.commit()?;
        Ok(account)
    }

    /// Get an account by ID
    pub fn get_account(&self, id: u64) -> Result<Option<Account>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(ACCOUNTS)?;

        match table.get(id)? {
            Some(data) => {
                let account: Account = bincode::deserialize(data.value())?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }

    /// Look up an account by normalized email
    pub fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let emails = read_txn.open_table(ACCOUNT_EMAILS)?;

        let id = match emails.get(email)? {
            Some(v) => v.value(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(ACCOUNTS)?;
        match table.get(id)? {
            Some(data) => {
                let account: Account = bincode::deserialize(data.value())?;
                Ok(Some(account))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::setup_db;
    use chrono::Utc;

    #[test]
    fn test_create_and_find_account() {
        let (db, _temp) = setup_db();

        let account = db
            .create_account("alice@example.com", "digest", Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(account.id, 1);

        let found = db.find_account_by_email("alice@example.com").unwrap();
        assert_eq!(found.unwrap().id, account.id);

        assert!(db.find_account_by_email("bob@example.com").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (db, _temp) = setup_db();

        assert!(db
            .create_account("alice@example.com", "digest", Utc::now())
            .unwrap()
            .is_some());
        assert!(db
            .create_account("alice@example.com", "other", Utc::now())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_account_ids_are_sequential() {
        let (db, _temp) = setup_db();

        let a = db
            .create_account("a@example.com", "d", Utc::now())
            .unwrap()
            .unwrap();
        let b = db
            .create_account("b@example.com", "d", Utc::now())
            .unwrap()
            .unwrap();
        assert_eq!(b.id, a.id + 1);
    }
}
