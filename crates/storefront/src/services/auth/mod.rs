//! Authentication service.
//!
//! Mock sign-in: there is no account database. Logging in accepts any
//! well-formed email with a non-empty password and derives the identity from
//! the email's local part, so `seller1@campus.edu` acts as `seller1`. The
//! signed-in user is persisted under the `user` key; passwords never are.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument};

use campus_market_core::{Email, UserId, UserRole};

use crate::error::{MarketError, Result};
use crate::models::User;
use crate::persistence::{KeyValuePersistence, StorageError, USER_KEY};
use crate::store::PersistentSlot;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Sign-up form.
///
/// Implements `Debug` manually to redact the passwords.
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
    pub role: UserRole,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .field("role", &self.role)
            .finish()
    }
}

/// The current session's signed-in user.
pub struct AuthSession {
    user: PersistentSlot<User>,
}

impl AuthSession {
    /// Restore the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub fn load(persistence: Arc<dyn KeyValuePersistence>) -> std::result::Result<Self, StorageError> {
        Ok(Self {
            user: PersistentSlot::load(persistence, USER_KEY)?,
        })
    }

    /// Sign in as a buyer.
    ///
    /// # Errors
    ///
    /// Same as [`Self::login_as`].
    pub fn login(&mut self, email: &str, password: &SecretString) -> std::result::Result<User, AuthError> {
        self.login_as(email, password, UserRole::Buyer)
    }

    /// Sign in with an explicit role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// `AuthError::InvalidCredentials` for an empty password, or
    /// `AuthError::Storage` if the session cannot be persisted.
    #[instrument(skip(self, password))]
    pub fn login_as(
        &mut self,
        email: &str,
        password: &SecretString,
        role: UserRole,
    ) -> std::result::Result<User, AuthError> {
        let email = Email::parse(email)?;
        if password.expose_secret().is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let handle = email.local_part().to_lowercase();
        let user = User {
            id: UserId::new(handle.clone()),
            name: handle.clone(),
            username: handle,
            email,
            role,
            avatar: None,
        };
        self.user.set(user.clone())?;

        info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// `AuthError::MissingField` for a blank name or username,
    /// `AuthError::WeakPassword` if the password is too short,
    /// `AuthError::PasswordMismatch` if the confirmation differs, or
    /// `AuthError::Storage` if the session cannot be persisted.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub fn register(&mut self, request: RegisterRequest) -> std::result::Result<User, AuthError> {
        let email = Email::parse(&request.email)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        let username = request.username.trim();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        validate_password(request.password.expose_secret())?;
        if request.password.expose_secret() != request.password_confirmation.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }

        let user = User {
            id: UserId::generate(),
            name: name.to_string(),
            username: username.to_string(),
            email,
            role: request.role,
            avatar: None,
        };
        self.user.set(user.clone())?;

        info!(user_id = %user.id, "Registered");
        Ok(user)
    }

    /// Sign out and forget the persisted session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the key cannot be removed.
    pub fn logout(&mut self) -> std::result::Result<(), AuthError> {
        if let Some(user) = self.user.get() {
            info!(user_id = %user.id, "Signed out");
        }
        self.user.clear()?;
        Ok(())
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.user.get()
    }

    /// Whether anyone is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.get().is_some()
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Unauthenticated` when nobody is signed in.
    pub fn require_user(&self) -> Result<&User> {
        self.user.get().ok_or(MarketError::Unauthenticated)
    }
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("user", &self.user.get().map(|u| &u.id))
            .finish()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
fn validate_password(password: &str) -> std::result::Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}
