//! PostgreSQL-backed `UserDirectory` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserDirectory, UserDirectoryError, UserRecord};
use crate::domain::UserId;

use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserDirectory` port.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserDirectoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserDirectoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserDirectoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserDirectoryError::connection("database connection error")
        }
        _ => UserDirectoryError::query("database error"),
    }
}

fn row_to_record(row: UserRow) -> Result<UserRecord, UserDirectoryError> {
    Ok(UserRecord {
        id: UserId::new(&row.id).map_err(|error| {
            UserDirectoryError::query(format!("invalid stored user id: {error}"))
        })?,
        email: row.email,
        display_name: row.display_name,
    })
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, UserDirectoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_str()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }
}
