//! Port abstraction for resolving platform user identities.
//!
//! Webhook reconciliation uses this port to verify that the user named in a
//! payment's correlation reference actually exists before granting access.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::UserId;

/// Errors raised by user directory adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserDirectoryError {
    /// Directory connection could not be established.
    #[error("user directory connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Lookup failed during execution.
    #[error("user directory query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl UserDirectoryError {
    /// Build a [`UserDirectoryError::Connection`] with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build a [`UserDirectoryError::Query`] with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// A resolved platform user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Identity-provider user identifier.
    pub id: UserId,
    /// Primary email address.
    pub email: String,
    /// Name shown in the UI.
    pub display_name: String,
}

/// Port for user identity lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve a user by identifier, returning `None` when unknown.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserDirectoryError>;
}

/// Fixture implementation resolving every identifier.
///
/// Use it where user existence is not under test; the returned record echoes
/// the requested identifier with placeholder contact details.
#[derive(Debug, Default)]
pub struct FixtureUserDirectory;

#[async_trait]
impl UserDirectory for FixtureUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserDirectoryError> {
        Ok(Some(UserRecord {
            id: id.clone(),
            email: format!("{id}@example.invalid"),
            display_name: format!("Fixture {id}"),
        }))
    }
}
