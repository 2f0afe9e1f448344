use chrono::Utc;
use thiserror::Error;

use crate::storage::models::Account;
use crate::storage::Database;

use super::password::{hash_password, verify_password, PasswordError};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Database error: {0}")]
    Database(#[from] crate::storage::DatabaseError),
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    Hash(#[from] PasswordError),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),
}

/// Lower-case and trim an email address for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

/// Register a new account and return it.
pub fn register(
    db: &Database,
    email: &str,
    password: &str,
    min_password_length: usize,
) -> Result<Account, AccountError> {
    let email = normalize_email(email);
    if !is_valid_email(&email) {
        return Err(AccountError::InvalidEmail);
    }
    if password.len() < min_password_length {
        return Err(AccountError::PasswordTooShort(min_password_length));
    }

    let digest = hash_password(password)?;
    let account = db
        .create_account(&email, &digest, Utc::now())?
        .ok_or(AccountError::EmailTaken)?;

    tracing::debug!(account_id = account.id, "Registered account");
    Ok(account)
}

/// Authenticate an account by email and password.
///
/// Unknown email and wrong password both come back as
/// `InvalidCredentials` — callers must not reveal which one it was.
pub fn login(db: &Database, email: &str, password: &str) -> Result<Account, AccountError> {
    let email = normalize_email(email);

    let account = db
        .find_account_by_email(&email)?
        .ok_or(AccountError::InvalidCredentials)?;

    if !verify_password(&account.password_hash, password) {
        return Err(AccountError::InvalidCredentials);
    }

    tracing::debug!(account_id = account.id, "Account logged in");
    Ok(account)
}
