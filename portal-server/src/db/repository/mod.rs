//! Repository Module
//!
//! CRUD operations over the SQLite tables, one module per collection.
//! Cross-store membership mutations (member + account) live in
//! [`membership`], which wraps each paired write in a single transaction.

// Identity / membership workflow
pub mod account;
pub mod counter;
pub mod member;
pub mod membership;

// Pricing
pub mod plan;

// Donations
pub mod payment;

// Bank / QR configuration
pub mod settings;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err
            && db_err.is_unique_violation()
        {
            return RepoError::Duplicate(db_err.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
