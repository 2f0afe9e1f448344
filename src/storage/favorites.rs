use redb::ReadableTable;

use super::db::{Database, DatabaseError};
use super::models::Favorite;
use super::tables::*;

impl Database {
    // ========================================================================
    // Favorite operations
    // ========================================================================

    /// Store a favorite and index it under its owning account
    pub fn put_favorite(&self, favorite: &Favorite) -> Result<(), DatabaseError> {
        debug_assert!(!favorite.id.is_empty(), "favorite id must not be empty");

        let write_txn = self.begin_write()?;
        {
            let mut table = write_txn.open_table(FAVORITES)?;
            let data = bincode::serialize(favorite)?;
            table.insert(favorite.id.as_str(), data.as_slice())?;

            // Update account_favorites index
            let mut index_table = write_txn.open_table(ACCOUNT_FAVORITES)?;
            let mut ids: Vec<String> = index_table
                .get(favorite.account_id)?
                .map(|v| bincode::deserialize(v.value()))
                .transpose()?
                .unwrap_or_default();

            if !ids.contains(&favorite.id) {
                ids.push(favorite.id.clone());
                let index_data = bincode::serialize(&ids)?;
                index_table.insert(favorite.account_id, index_data.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get all favorites for an account
    pub fn get_favorites_by_account(
        &self,
        account_id: u64,
    ) -> Result<Vec<Favorite>, DatabaseError> {
        let read_txn = self.begin_read()?;
        let index_table = read_txn.open_table(ACCOUNT_FAVORITES)?;
        let favorites_table = read_txn.open_table(FAVORITES)?;

        let ids: Vec<String> = match index_table.get(account_id)? {
            Some(data) => bincode::deserialize(data.value())?,
            None => return Ok(Vec::new()),
        };

        let mut favorites = Vec::new();
        for id in ids {
            if let Some(data) = favorites_table.get(id.as_str())? {
                let favorite: Favorite = bincode::deserialize(data.value())?;
                favorites.push(favorite);
            }
        }

        Ok(favorites)
    }

    /// Delete a favorite if it exists and belongs to the given account
    pub fn delete_favorite_for_account(
        &self,
        account_id: u64,
        favorite_id: &str,
    ) -> Result<bool, DatabaseError> {
        let write_txn = self.begin_write()?;

        // Get the favorite first to check ownership
        let favorite: Option<Favorite> = {
            let table = write_txn.open_table(FAVORITES)?;
            let favorite = match table.get(favorite_id)? {
                Some(data) => Some(bincode::deserialize(data.value())?),
                None => None,
            };
            favorite
        };

        let deleted = match favorite {
            Some(favorite) if favorite.account_id == account_id => {
                {
                    let mut table = write_txn.open_table(FAVORITES)?;
                    table.remove(favorite_id)?;
                }

                // Update account_favorites index
                let ids: Option<Vec<String>> = {
                    let index_table = write_txn.open_table(ACCOUNT_FAVORITES)?;
                    let ids = match index_table.get(account_id)? {
                        Some(data) => Some(bincode::deserialize(data.value())?),
                        None => None,
                    };
                    ids
                };

                if let Some(mut ids) = ids {
                    ids.retain(|id| id != favorite_id);
                    let mut index_table = write_txn.open_table(ACCOUNT_FAVORITES)?;
                    if ids.is_empty() {
                        index_table.remove(account_id)?;
                    } else {
                        let index_data = bincode::serialize(&ids)?;
                        index_table.insert(account_id, index_data.as_slice())?;
                    }
                }

                true
            }
            _ => false,
        };

        write_txn.commit()?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use crate::testutil::{make_favorite, setup_db};

    #[test]
    fn test_put_and_list_favorites() {
        let (db, _temp) = setup_db();

        db.put_favorite(&make_favorite("f1", 1, "http://x/a")).unwrap();
        db.put_favorite(&make_favorite("f2", 1, "http://x/b")).unwrap();
        db.put_favorite(&make_favorite("f3", 2, "http://x/c")).unwrap();

        assert_eq!(db.get_favorites_by_account(1).unwrap().len(), 2);
        assert_eq!(db.get_favorites_by_account(2).unwrap().len(), 1);
        assert!(db.get_favorites_by_account(3).unwrap().is_empty());
    }

    #[test]
    fn test_delete_checks_ownership() {
        let (db, _temp) = setup_db();

        db.put_favorite(&make_favorite("f1", 1, "http://x/a")).unwrap();

        // Another account cannot delete it
        assert!(!db.delete_favorite_for_account(2, "f1").unwrap());
        assert_eq!(db.get_favorites_by_account(1).unwrap().len(), 1);

        assert!(db.delete_favorite_for_account(1, "f1").unwrap());
        assert!(db.get_favorites_by_account(1).unwrap().is_empty());

        // Deleting again is a no-op
        assert!(!db.delete_favorite_for_account(1, "f1").unwrap());
    }
}
