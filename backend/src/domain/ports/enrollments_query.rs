//! Port abstraction for listing a user's entitlements.

use async_trait::async_trait;

use crate::domain::{Enrollment, Error, UserId};

/// Port for the enrollment listing use case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentsQuery: Send + Sync {
    /// List the entitlements held by the given user.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Enrollment>, Error>;
}

/// Fixture implementation returning no entitlements.
#[derive(Debug, Default)]
pub struct FixtureEnrollmentsQuery;

#[async_trait]
impl EnrollmentsQuery for FixtureEnrollmentsQuery {
    async fn list_for_user(&self, _user_id: &UserId) -> Result<Vec<Enrollment>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_query_returns_nothing() {
        let query = FixtureEnrollmentsQuery;
        let user = UserId::new("u1").expect("valid user id");
        let rows = query
            .list_for_user(&user)
            .await
            .expect("fixture list should succeed");
        assert!(rows.is_empty());
    }
}
