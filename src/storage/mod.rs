mod accounts;
mod db;
mod documents;
mod favorites;
pub mod models;
pub mod tables;

pub use db::{Database, DatabaseError};
