//! PostgreSQL-backed `EnrollmentRepository` implementation using Diesel ORM.
//!
//! The `enrollments_user_course_unique` constraint is the authoritative
//! duplicate guard; this adapter surfaces its violation as
//! [`EnrollmentRepositoryError::Conflict`] so callers can treat a lost insert
//! race as an already-recorded grant.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{EnrollmentRepository, EnrollmentRepositoryError};
use crate::domain::{CourseId, Enrollment, UserId};

use super::models::{EnrollmentRow, NewEnrollmentRow};
use super::pool::{DbPool, PoolError};
use super::schema::enrollments;

/// Diesel-backed implementation of the `EnrollmentRepository` port.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain enrollment repository errors.
fn map_pool_error(error: PoolError) -> EnrollmentRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            EnrollmentRepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to domain enrollment repository errors.
fn map_diesel_error(error: diesel::result::Error) -> EnrollmentRepositoryError {
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
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            EnrollmentRepositoryError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            EnrollmentRepositoryError::connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => EnrollmentRepositoryError::query("database error"),
        DieselError::NotFound => EnrollmentRepositoryError::query("record not found"),
        _ => EnrollmentRepositoryError::query("database error"),
    }
}

/// Convert a database row to a domain enrollment.
fn row_to_enrollment(row: EnrollmentRow) -> Result<Enrollment, EnrollmentRepositoryError> {
    Ok(Enrollment {
        user_id: UserId::new(&row.user_id).map_err(|error| {
            EnrollmentRepositoryError::query(format!("invalid stored user id: {error}"))
        })?,
        course_id: CourseId::new(&row.course_id).map_err(|error| {
            EnrollmentRepositoryError::query(format!("invalid stored course id: {error}"))
        })?,
        purchased_at: row.purchased_at,
    })
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn exists(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let found: Option<i64> = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_str()))
            .filter(enrollments::course_id.eq(course_id.as_str()))
            .select(enrollments::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(found.is_some())
    }

    async fn create(&self, enrollment: &Enrollment) -> Result<(), EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewEnrollmentRow {
            user_id: enrollment.user_id.as_str(),
            course_id: enrollment.course_id.as_str(),
            purchased_at: enrollment.purchased_at,
        };

        diesel::insert_into(enrollments::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<EnrollmentRow> = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_str()))
            .order(enrollments::purchased_at.desc())
            .select(EnrollmentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_enrollment).collect()
    }
}
