//! Acting user and delete authorization.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use common::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorKind;
use crate::user::{Role, User};

/// Errors raised by authorization checks.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No user with this id.
    #[error("Unknown user: {0}")]
    UnknownUser(UserId),

    /// The user was deactivated.
    #[error("User is inactive: {0}")]
    InactiveUser(UserId),

    /// The action requires an administrator.
    #[error("Administrator role required to {action}")]
    AdminRequired { action: &'static str },

    /// Wrong confirmation password.
    #[error("Invalid confirmation password")]
    InvalidCredential,

    /// Deletes are disabled because no credential is configured.
    #[error("Delete confirmation is not configured")]
    NotConfigured,

    /// The configured hash could not be parsed or produced.
    #[error("Credential hash error: {0}")]
    Hash(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Hash(_) => ErrorKind::Internal,
            _ => ErrorKind::Authorization,
        }
    }
}

/// The user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: UserId,
    pub name: String,
    pub role: Role,
}

impl Actor {
    /// Builds the actor for an active user.
    pub fn from_user(user: &User) -> Result<Self, AuthError> {
        if !user.active {
            return Err(AuthError::InactiveUser(user.id));
        }
        Ok(Self {
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
        })
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fails unless the actor is an administrator.
    pub fn require_admin(&self, action: &'static str) -> Result<(), AuthError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::AdminRequired { action })
        }
    }
}

/// Capability check guarding order deletion.
pub trait DeleteAuthorizer: Send + Sync {
    /// Succeeds if `actor` may delete an order after confirming with `password`.
    fn authorize_delete(&self, actor: &Actor, password: &str) -> Result<(), AuthError>;
}

/// Requires an administrator and a password matching a configured argon2 hash.
///
/// Without a configured hash every delete is refused.
#[derive(Debug, Clone, Default)]
pub struct AdminCredentialAuthorizer {
    password_hash: Option<String>,
}

impl AdminCredentialAuthorizer {
    /// Creates an authorizer from a PHC-format argon2 hash.
    pub fn new(password_hash: Option<String>) -> Self {
        Self {
            password_hash: password_hash.filter(|h| !h.trim().is_empty()),
        }
    }

    /// An authorizer that refuses every delete.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.password_hash.is_some()
    }
}

impl DeleteAuthorizer for AdminCredentialAuthorizer {
    fn authorize_delete(&self, actor: &Actor, password: &str) -> Result<(), AuthError> {
        actor.require_admin("delete orders")?;

        let hash = self.password_hash.as_deref().ok_or(AuthError::NotConfigured)?;
        let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hash(e.to_string()))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AuthError::InvalidCredential)
    }
}

/// Hashes a password into a PHC string suitable for configuration.
pub fn hash_credential(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}
