//! Domain ports and supporting types for the hexagonal boundary.

mod checkout_command;
mod enrollment_repository;
mod enrollments_query;
mod payment_gateway;
mod reconcile_command;
mod user_directory;

#[cfg(test)]
pub use checkout_command::MockCheckoutCommand;
pub use checkout_command::{
    CheckoutCommand, CheckoutError, CheckoutHandle, CheckoutRequest, FixtureCheckoutCommand,
};
#[cfg(test)]
pub use enrollment_repository::MockEnrollmentRepository;
pub use enrollment_repository::{
    EnrollmentRepository, EnrollmentRepositoryError, FixtureEnrollmentRepository,
    InMemoryEnrollmentRepository,
};
#[cfg(test)]
pub use enrollments_query::MockEnrollmentsQuery;
pub use enrollments_query::{EnrollmentsQuery, FixtureEnrollmentsQuery};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    FixturePaymentGateway, PaymentGateway, PaymentGatewayError, PurchaseIntent,
    PurchaseIntentRequest,
};
#[cfg(test)]
pub use reconcile_command::MockReconcileCommand;
pub use reconcile_command::{
    FixtureReconcileCommand, PaymentEvent, ReconcileCommand, ReconciliationError,
    ReconciliationOutcome,
};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{FixtureUserDirectory, UserDirectory, UserDirectoryError, UserRecord};
