//! Authentication error types.

use thiserror::Error;

use crate::persistence::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] campus_market_core::EmailError),

    /// Invalid credentials (empty password or unusable identity).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Required profile field missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Session could not be persisted.
    #[error("session storage error: {0}")]
    Storage(#[from] StorageError),
}
