//! Entitlement granted to a user for a course.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{CourseId, UserId};

/// A durable (user, course) entitlement.
///
/// Uniqueness over the (user, course) pair is enforced by storage; this type
/// carries no surrogate key because the pair is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Owner of the entitlement.
    pub user_id: UserId,
    /// Course the user may access.
    pub course_id: CourseId,
    /// When the purchase was reconciled.
    pub purchased_at: DateTime<Utc>,
}
