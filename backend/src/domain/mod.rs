//! Domain model, services, and ports.

mod checkout;
mod enrollment;
mod enrollment_query;
mod error;
mod ids;
mod payment;
mod reconciliation;
mod reference;

pub mod ports;

pub use checkout::{CheckoutMode, CheckoutService};
pub use enrollment::Enrollment;
pub use enrollment_query::EnrollmentQueryService;
pub use error::{Error, ErrorCode};
pub use ids::{CourseId, IdValidationError, PaymentId, UserId};
pub use payment::{Payment, PaymentStatus};
pub use reconciliation::ReconciliationService;
pub use reference::{CorrelationReference, ReferenceError};
