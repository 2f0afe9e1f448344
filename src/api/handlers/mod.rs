mod accounts;
mod admin;
mod documents;
mod favorites;

pub use accounts::{login, logout, me, register};
pub use admin::health;
pub use documents::{create_document, get_document, set_expiry, set_password, update_document};
pub use favorites::{create_favorite, delete_favorite, list_favorites, merge_favorites};

use crate::api::response::ApiError;
use crate::auth::accounts::AccountError;
use crate::documents::DocumentError;
use crate::favorites::FavoriteError;

/// Map a DocumentError to an ApiError
fn document_error(e: DocumentError) -> ApiError {
    match e {
        DocumentError::NotFound => ApiError::not_found("Document not found"),
        DocumentError::Expired => ApiError::expired("Document has expired"),
        DocumentError::PasswordRequired => {
            ApiError::unauthorized("This document requires a password", "password_required")
        }
        DocumentError::InvalidPassword => {
            ApiError::unauthorized("Invalid document password", "invalid_password")
        }
        DocumentError::PasswordAlreadySet => ApiError::conflict(
            "This document already has a password",
            "password_already_set",
        ),
        DocumentError::ContentTooLarge { limit } => {
            ApiError::payload_too_large(format!("Content exceeds the {limit}-byte limit"))
        }
        DocumentError::PasswordTooShort(min) => {
            ApiError::bad_request(format!("Password must be at least {min} characters"))
        }
        DocumentError::Database(e) => ApiError::internal(e.to_string()),
        DocumentError::Hash(e) => ApiError::internal(e.to_string()),
    }
}

/// Map an AccountError to an ApiError
fn account_error(e: AccountError) -> ApiError {
    match e {
        AccountError::InvalidCredentials => {
            ApiError::unauthorized("Invalid email or password", "invalid_credentials")
        }
        AccountError::EmailTaken => {
            ApiError::conflict("An account with this email already exists", "email_taken")
        }
        AccountError::InvalidEmail => ApiError::bad_request("Invalid email address"),
        AccountError::PasswordTooShort(min) => {
            ApiError::bad_request(format!("Password must be at least {min} characters"))
        }
        AccountError::Database(e) => ApiError::internal(e.to_string()),
        AccountError::Hash(e) => ApiError::internal(e.to_string()),
    }
}

/// Map a FavoriteError to an ApiError
fn favorite_error(e: FavoriteError) -> ApiError {
    match e {
        FavoriteError::NotFound => ApiError::not_found("Favorite not found"),
        FavoriteError::Database(e) => ApiError::internal(e.to_string()),
    }
}
