//! Validated identifier newtypes shared across the domain.
//!
//! User and course identifiers travel inside the provider's
//! `external_reference` string, where `|` separates the user from the course
//! list and `,` separates courses. Rejecting those characters at construction
//! keeps the encoded reference unambiguous.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum accepted length for user and course identifiers.
const MAX_ID_LENGTH: usize = 64;

/// Characters that would corrupt an encoded correlation reference.
const RESERVED_CHARACTERS: [char; 2] = ['|', ','];

/// Validation failure for an identifier newtype.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdValidationError {
    /// The identifier was empty or whitespace only.
    #[error("{field} must not be empty")]
    Empty {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The identifier contained a separator character.
    #[error("{field} must not contain '|' or ',': {value}")]
    ReservedCharacter {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The identifier exceeded [`MAX_ID_LENGTH`] characters.
    #[error("{field} must be at most {MAX_ID_LENGTH} characters")]
    TooLong {
        /// Name of the offending field.
        field: &'static str,
    },
}

fn validate(field: &'static str, raw: &str) -> Result<String, IdValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(IdValidationError::Empty { field });
    }
    if trimmed.chars().any(|c| RESERVED_CHARACTERS.contains(&c)) {
        return Err(IdValidationError::ReservedCharacter {
            field,
            value: trimmed.to_owned(),
        });
    }
    if trimmed.chars().count() > MAX_ID_LENGTH {
        return Err(IdValidationError::TooLong { field });
    }
    Ok(trimmed.to_owned())
}

/// Identifier of a platform user as issued by the identity provider.
///
/// # Examples
/// ```
/// use coursepay::domain::UserId;
///
/// let id = UserId::new("user-42").expect("valid id");
/// assert_eq!(id.as_str(), "user-42");
/// assert!(UserId::new("a|b").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw user identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
        validate("userId", raw.as_ref()).map(Self)
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Identifier of a purchasable course.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    /// Validate and wrap a raw course identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
        validate("courseId", raw.as_ref()).map(Self)
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Provider-assigned payment identifier.
///
/// Payment identifiers never appear inside correlation references, so only
/// emptiness is rejected; the provider controls the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentId(String);

impl PaymentId {
    /// Validate and wrap a raw payment identifier.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdValidationError::Empty { field: "paymentId" });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

macro_rules! impl_display_and_as_ref {
    ($($ty:ty),+) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    self.0.as_str()
                }
            }
        )+
    };
}

impl_display_and_as_ref!(UserId, CourseId, PaymentId);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn user_id_rejects_empty_input(#[case] raw: &str) {
        assert_eq!(
            UserId::new(raw),
            Err(IdValidationError::Empty { field: "userId" })
        );
    }

    #[rstest]
    #[case("a|b")]
    #[case("a,b")]
    fn course_id_rejects_reserved_characters(#[case] raw: &str) {
        assert!(matches!(
            CourseId::new(raw),
            Err(IdValidationError::ReservedCharacter { field: "courseId", .. })
        ));
    }

    #[test]
    fn user_id_rejects_overlong_input() {
        let raw = "x".repeat(MAX_ID_LENGTH + 1);
        assert_eq!(
            UserId::new(raw),
            Err(IdValidationError::TooLong { field: "userId" })
        );
    }

    #[test]
    fn identifiers_trim_surrounding_whitespace() {
        let id = CourseId::new("  course-7  ").expect("valid id");
        assert_eq!(id.as_str(), "course-7");
    }

    #[test]
    fn payment_id_accepts_provider_formats() {
        let id = PaymentId::new("123456789").expect("valid id");
        assert_eq!(id.to_string(), "123456789");
    }
}
