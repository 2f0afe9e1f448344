use redb::TableDefinition;

/// Documents: document_id -> Document (bincode)
pub const DOCUMENTS: TableDefinition<&str, &[u8]> = TableDefinition::new("documents");

/// Accounts: account_id -> Account (bincode)
pub const ACCOUNTS: TableDefinition<u64, &[u8]> = TableDefinition::new("accounts");

/// Unique email index: normalized_email -> account_id
pub const ACCOUNT_EMAILS: TableDefinition<&str, u64> = TableDefinition::new("account_emails");

/// Favorites: favorite_id -> Favorite (bincode)
pub const FAVORITES: TableDefinition<&str, &[u8]> = TableDefinition::new("favorites");

/// Secondary index: account_id -> Vec<favorite_id> (for listing by account)
pub const ACCOUNT_FAVORITES: TableDefinition<u64, &[u8]> =
    TableDefinition::new("account_favorites");

/// Meta counters: name ("next_account_id") -> u64
pub const META: TableDefinition<&str, u64> = TableDefinition::new("meta");
