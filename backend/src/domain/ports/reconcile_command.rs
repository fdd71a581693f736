//! Port abstraction for webhook-driven payment reconciliation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{PaymentId, PaymentStatus, UserId};

/// A provider webhook notification after transport-level validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    /// Provider action string (e.g. `payment.updated`).
    pub action: String,
    /// Payment the notification refers to.
    pub payment_id: PaymentId,
}

/// Result of processing a payment event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// The action is not payment-related; nothing was done.
    Ignored {
        /// The action that was skipped.
        action: String,
    },
    /// The payment exists but is not approved; nothing was granted.
    NotApproved {
        /// Status reported by the provider.
        status: PaymentStatus,
    },
    /// Entitlements were reconciled for the paying user.
    Granted {
        /// User who received access.
        user_id: UserId,
        /// Courses granted in this pass, counting already-held courses.
        granted: usize,
        /// Courses named in the correlation reference.
        requested: usize,
    },
}

/// Errors surfaced to the webhook endpoint.
///
/// Variants map onto the endpoint's retry contract: unavailability errors
/// become 5xx responses so the provider redelivers, while malformed data
/// becomes 4xx because redelivery cannot fix it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconciliationError {
    /// The provider payment lookup failed.
    #[error("payment provider unavailable: {message}")]
    GatewayUnavailable {
        /// Diagnostic description of the provider failure.
        message: String,
    },
    /// The payment carries no usable correlation reference.
    #[error("payment reference is missing or malformed: {message}")]
    MalformedReference {
        /// Diagnostic description of the reference problem.
        message: String,
    },
    /// The referenced user does not exist on the platform.
    #[error("payment references unknown user {user_id}")]
    UnknownPayer {
        /// The unresolvable user identifier.
        user_id: UserId,
    },
    /// The user directory could not be queried.
    #[error("user directory unavailable: {message}")]
    DirectoryUnavailable {
        /// Diagnostic description of the directory failure.
        message: String,
    },
    /// No entitlement could be written.
    #[error("enrollment store unavailable: {message}")]
    StoreUnavailable {
        /// Diagnostic description of the storage failure.
        message: String,
    },
}

/// Port for the webhook reconciliation use case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReconcileCommand: Send + Sync {
    /// Reconcile a provider payment event against the entitlement store.
    async fn process(
        &self,
        event: PaymentEvent,
    ) -> Result<ReconciliationOutcome, ReconciliationError>;
}

/// Fixture implementation that ignores every event.
#[derive(Debug, Default)]
pub struct FixtureReconcileCommand;

#[async_trait]
impl ReconcileCommand for FixtureReconcileCommand {
    async fn process(
        &self,
        event: PaymentEvent,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        Ok(ReconciliationOutcome::Ignored {
            action: event.action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_reconcile_ignores_events() {
        let command = FixtureReconcileCommand;
        let outcome = command
            .process(PaymentEvent {
                action: "payment.updated".to_owned(),
                payment_id: PaymentId::new("p1").expect("valid payment id"),
            })
            .await
            .expect("fixture process should succeed");
        assert_eq!(
            outcome,
            ReconciliationOutcome::Ignored {
                action: "payment.updated".to_owned()
            }
        );
    }
}
