//! Enrollment listing service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::error::Error;
use super::ports::{EnrollmentRepository, EnrollmentRepositoryError, EnrollmentsQuery};
use super::{Enrollment, UserId};

/// Read-side use case backing the "my courses" listing.
pub struct EnrollmentQueryService<R: ?Sized> {
    enrollments: Arc<R>,
}

impl<R> EnrollmentQueryService<R>
where
    R: EnrollmentRepository + ?Sized,
{
    /// Build the service around an enrollment repository.
    pub fn new(enrollments: Arc<R>) -> Self {
        Self { enrollments }
    }
}

#[async_trait]
impl<R> EnrollmentsQuery for EnrollmentQueryService<R>
where
    R: EnrollmentRepository + ?Sized,
{
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Enrollment>, Error> {
        self.enrollments
            .list_for_user(user_id)
            .await
            .map_err(|error| {
                warn!(user_id = %user_id, %error, "enrollment listing failed");
                match error {
                    EnrollmentRepositoryError::Connection { .. } => {
                        Error::service_unavailable("enrollment store unavailable")
                    }
                    EnrollmentRepositoryError::Query { .. }
                    | EnrollmentRepositoryError::Conflict { .. } => {
                        Error::internal("enrollment listing failed")
                    }
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{InMemoryEnrollmentRepository, MockEnrollmentRepository};
    use crate::domain::{CourseId, ErrorCode};
    use chrono::Utc;

    #[tokio::test]
    async fn lists_the_users_enrollments() {
        let store = Arc::new(InMemoryEnrollmentRepository::new());
        store
            .create(&Enrollment {
                user_id: UserId::new("u1").expect("valid user id"),
                course_id: CourseId::new("c1").expect("valid course id"),
                purchased_at: Utc::now(),
            })
            .await
            .expect("insert succeeds");

        let query = EnrollmentQueryService::new(store);
        let user = UserId::new("u1").expect("valid user id");
        let rows = query.list_for_user(&user).await.expect("list succeeds");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn connection_failures_map_to_service_unavailable() {
        let mut repo = MockEnrollmentRepository::new();
        repo.expect_list_for_user()
            .returning(|_| Err(EnrollmentRepositoryError::connection("pool exhausted")));

        let query = EnrollmentQueryService::new(Arc::new(repo));
        let user = UserId::new("u1").expect("valid user id");
        let error = query
            .list_for_user(&user)
            .await
            .expect_err("connection failure surfaces");
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn query_failures_are_internal() {
        let mut repo = MockEnrollmentRepository::new();
        repo.expect_list_for_user()
            .returning(|_| Err(EnrollmentRepositoryError::query("bad statement")));

        let query = EnrollmentQueryService::new(Arc::new(repo));
        let user = UserId::new("u1").expect("valid user id");
        let error = query
            .list_for_user(&user)
            .await
            .expect_err("query failure surfaces");
        assert_eq!(error.code(), ErrorCode::InternalError);
    }
}
