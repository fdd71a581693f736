//! Port abstraction for entitlement persistence.
//!
//! Adapters must enforce uniqueness over the (user, course) pair at the
//! storage level and surface a violated constraint as
//! [`EnrollmentRepositoryError::Conflict`]; callers treat that conflict as a
//! successfully recorded grant.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CourseId, Enrollment, UserId};

/// Errors raised by enrollment repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrollmentRepositoryError {
    /// Repository connection could not be established.
    #[error("enrollment repository connection failed: {message}")]
    Connection {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("enrollment repository query failed: {message}")]
    Query {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// An enrollment for this (user, course) pair already exists.
    #[error("enrollment already exists: {message}")]
    Conflict {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl EnrollmentRepositoryError {
    /// Build an [`EnrollmentRepositoryError::Connection`] with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build an [`EnrollmentRepositoryError::Query`] with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Build an [`EnrollmentRepositoryError::Conflict`] with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Port for entitlement storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Whether the user already holds an entitlement for the course.
    async fn exists(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, EnrollmentRepositoryError>;

    /// Persist a new entitlement.
    ///
    /// Returns [`EnrollmentRepositoryError::Conflict`] when the (user, course)
    /// pair is already recorded, including when a concurrent writer won the
    /// race after a negative [`EnrollmentRepository::exists`] check.
    async fn create(&self, enrollment: &Enrollment) -> Result<(), EnrollmentRepositoryError>;

    /// List all entitlements held by the user.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError>;
}

/// Fixture implementation for testing without a real database.
///
/// Reports no existing enrollments, accepts every write, and lists nothing.
#[derive(Debug, Default)]
pub struct FixtureEnrollmentRepository;

#[async_trait]
impl EnrollmentRepository for FixtureEnrollmentRepository {
    async fn exists(
        &self,
        _user_id: &UserId,
        _course_id: &CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        Ok(false)
    }

    async fn create(&self, _enrollment: &Enrollment) -> Result<(), EnrollmentRepositoryError> {
        Ok(())
    }

    async fn list_for_user(
        &self,
        _user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError> {
        Ok(Vec::new())
    }
}

/// In-memory implementation with real uniqueness semantics.
///
/// Backs local development and the integration suite. The mutex-guarded
/// vector makes create-after-exists races observable the same way the
/// database constraint does.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentRepository {
    rows: std::sync::Mutex<Vec<Enrollment>>,
}

impl InMemoryEnrollmentRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored enrollments, for test assertions.
    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Whether the repository holds no enrollments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn exists(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
    ) -> Result<bool, EnrollmentRepositoryError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| EnrollmentRepositoryError::query("enrollment store lock poisoned"))?;
        Ok(rows
            .iter()
            .any(|row| &row.user_id == user_id && &row.course_id == course_id))
    }

    async fn create(&self, enrollment: &Enrollment) -> Result<(), EnrollmentRepositoryError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| EnrollmentRepositoryError::query("enrollment store lock poisoned"))?;
        if rows
            .iter()
            .any(|row| row.user_id == enrollment.user_id && row.course_id == enrollment.course_id)
        {
            return Err(EnrollmentRepositoryError::conflict(format!(
                "user {} already enrolled in {}",
                enrollment.user_id, enrollment.course_id
            )));
        }
        rows.push(enrollment.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Enrollment>, EnrollmentRepositoryError> {
        let rows = self
            .rows
            .lock()
            .map_err(|_| EnrollmentRepositoryError::query("enrollment store lock poisoned"))?;
        Ok(rows
            .iter()
            .filter(|row| &row.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn enrollment(user: &str, course: &str) -> Enrollment {
        Enrollment {
            user_id: UserId::new(user).expect("valid user id"),
            course_id: CourseId::new(course).expect("valid course id"),
            purchased_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn fixture_repository_reports_no_enrollments() {
        let repo = FixtureEnrollmentRepository;
        let user = UserId::new("u1").expect("valid user id");
        let course = CourseId::new("c1").expect("valid course id");

        assert!(!repo.exists(&user, &course).await.expect("exists succeeds"));
        assert!(repo
            .list_for_user(&user)
            .await
            .expect("list succeeds")
            .is_empty());
    }

    #[tokio::test]
    async fn in_memory_repository_enforces_uniqueness() {
        let repo = InMemoryEnrollmentRepository::new();
        let row = enrollment("u1", "c1");

        repo.create(&row).await.expect("first insert succeeds");
        let second = repo.create(&row).await;
        assert!(matches!(
            second,
            Err(EnrollmentRepositoryError::Conflict { .. })
        ));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn in_memory_repository_scopes_listing_to_the_user() {
        let repo = InMemoryEnrollmentRepository::new();
        repo.create(&enrollment("u1", "c1"))
            .await
            .expect("insert succeeds");
        repo.create(&enrollment("u2", "c1"))
            .await
            .expect("insert succeeds");

        let user = UserId::new("u1").expect("valid user id");
        let rows = repo.list_for_user(&user).await.expect("list succeeds");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, user);
    }
}
