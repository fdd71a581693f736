//! Correlation reference linking a provider payment to platform state.
//!
//! Checkout encodes the buying user and the purchased courses into the
//! provider's `external_reference` field; webhook reconciliation decodes it
//! back. The wire form is `"<user>|<course>[,<course>...]"`.

use thiserror::Error;

use super::ids::{CourseId, IdValidationError, UserId};

/// Failure to construct or decode a correlation reference.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    /// A reference must cover at least one course.
    #[error("reference must contain at least one course")]
    EmptyCourseList,
    /// The encoded form lacks the `|` separator.
    #[error("reference is missing the user/course separator")]
    MissingSeparator,
    /// A segment failed identifier validation.
    #[error(transparent)]
    InvalidSegment(#[from] IdValidationError),
}

/// Decoded `external_reference` payload.
///
/// # Examples
/// ```
/// use coursepay::domain::{CorrelationReference, CourseId, UserId};
///
/// let user = UserId::new("u1").expect("valid");
/// let course = CourseId::new("c1").expect("valid");
/// let reference = CorrelationReference::single(user, course);
/// assert_eq!(reference.encode(), "u1|c1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationReference {
    user_id: UserId,
    course_ids: Vec<CourseId>,
}

impl CorrelationReference {
    /// Build a reference for one user and one or more courses.
    pub fn new(user_id: UserId, course_ids: Vec<CourseId>) -> Result<Self, ReferenceError> {
        if course_ids.is_empty() {
            return Err(ReferenceError::EmptyCourseList);
        }
        Ok(Self {
            user_id,
            course_ids,
        })
    }

    /// Build a reference for a single-course purchase.
    pub fn single(user_id: UserId, course_id: CourseId) -> Self {
        Self {
            user_id,
            course_ids: vec![course_id],
        }
    }

    /// Encode into the provider wire form.
    pub fn encode(&self) -> String {
        let courses = self
            .course_ids
            .iter()
            .map(CourseId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!("{}|{}", self.user_id, courses)
    }

    /// Decode the provider wire form.
    ///
    /// Identifier validation applies to every segment, so a tampered or
    /// truncated reference is rejected rather than partially honoured.
    pub fn parse(raw: &str) -> Result<Self, ReferenceError> {
        let (user, courses) = raw
            .split_once('|')
            .ok_or(ReferenceError::MissingSeparator)?;
        let user_id = UserId::new(user)?;
        let course_ids = courses
            .split(',')
            .map(CourseId::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(user_id, course_ids)
    }

    /// The buying user.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The purchased courses, in checkout order.
    pub fn course_ids(&self) -> &[CourseId] {
        &self.course_ids
    }
}
