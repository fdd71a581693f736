//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{CourseId, Error};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidIdentifier,
    InvalidPrice,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidIdentifier => "invalid_identifier",
            ErrorCode::InvalidPrice => "invalid_price",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn parse_course_id(value: String, field: FieldName) -> Result<CourseId, Error> {
    CourseId::new(&value).map_err(|_| {
        let field_name = field.as_str();
        ValidationError::new(
            field_name,
            format!("{field_name} must be a valid course identifier"),
        )
        .with_value(ErrorCode::InvalidIdentifier, value)
    })
}

pub(crate) fn require_text(value: String, field: FieldName) -> Result<String, Error> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing_field_error(field));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn require_finite_price(value: f64, field: FieldName) -> Result<f64, Error> {
    if !value.is_finite() || value < 0.0 {
        let field_name = field.as_str();
        return Err(ValidationError::new(
            field_name,
            format!("{field_name} must be a non-negative number"),
        )
        .with_value(ErrorCode::InvalidPrice, value.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PRICE: FieldName = FieldName::new("coursePrice");
    const COURSE: FieldName = FieldName::new("courseId");

    #[test]
    fn missing_field_errors_name_the_field() {
        let error = missing_field_error(FieldName::new("courseTitle"));
        let details = error.details().expect("details attached");
        assert_eq!(details["field"], "courseTitle");
        assert_eq!(details["code"], "missing_field");
    }

    #[rstest]
    #[case("")]
    #[case("a|b")]
    fn invalid_course_ids_are_rejected_with_context(#[case] raw: &str) {
        let error = parse_course_id(raw.to_owned(), COURSE).expect_err("rejected");
        let details = error.details().expect("details attached");
        assert_eq!(details["code"], "invalid_identifier");
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(-1.0)]
    fn invalid_prices_are_rejected(#[case] raw: f64) {
        let error = require_finite_price(raw, PRICE).expect_err("rejected");
        let details = error.details().expect("details attached");
        assert_eq!(details["code"], "invalid_price");
    }

    #[test]
    fn zero_price_is_accepted() {
        // The provider minimum is applied downstream, not here.
        assert!(require_finite_price(0.0, PRICE).is_ok());
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(
            require_text("  Intro  ".to_owned(), FieldName::new("courseTitle"))
                .expect("accepted"),
            "Intro"
        );
        assert!(require_text("   ".to_owned(), FieldName::new("courseTitle")).is_err());
    }
}
