//! Webhook payment reconciliation service.
//!
//! Processes provider payment events: filters irrelevant actions, fetches the
//! authoritative payment state, decodes the correlation reference, verifies
//! the payer exists, and grants the referenced entitlements idempotently.
//!
//! The provider delivers notifications at least once, so every step tolerates
//! replays. Duplicate grants are absorbed by the storage-level uniqueness
//! constraint rather than by application bookkeeping.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::enrollment::Enrollment;
use super::ports::{
    EnrollmentRepository, EnrollmentRepositoryError, PaymentEvent, PaymentGateway,
    PaymentGatewayError, ReconcileCommand, ReconciliationError, ReconciliationOutcome,
    UserDirectory, UserDirectoryError,
};
use super::reference::CorrelationReference;

/// Provider actions that carry a payment state change.
const RELEVANT_ACTIONS: [&str; 2] = ["payment.created", "payment.updated"];

/// Webhook reconciliation use case.
pub struct ReconciliationService<G: ?Sized, R: ?Sized, U: ?Sized> {
    gateway: Arc<G>,
    enrollments: Arc<R>,
    users: Arc<U>,
    clock: Arc<dyn Clock>,
}

impl<G, R, U> ReconciliationService<G, R, U>
where
    G: PaymentGateway + ?Sized,
    R: EnrollmentRepository + ?Sized,
    U: UserDirectory + ?Sized,
{
    /// Build the service around its collaborating ports.
    pub fn new(
        gateway: Arc<G>,
        enrollments: Arc<R>,
        users: Arc<U>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            gateway,
            enrollments,
            users,
            clock,
        }
    }

    /// Grant one course, treating an already-held entitlement as success.
    async fn grant_course(
        &self,
        enrollment: &Enrollment,
    ) -> Result<GrantResult, EnrollmentRepositoryError> {
        if self
            .enrollments
            .exists(&enrollment.user_id, &enrollment.course_id)
            .await?
        {
            return Ok(GrantResult::AlreadyEnrolled);
        }
        match self.enrollments.create(enrollment).await {
            Ok(()) => Ok(GrantResult::Created),
            // A concurrent delivery inserted the row between the existence
            // check and the write. The entitlement is in place either way.
            Err(EnrollmentRepositoryError::Conflict { .. }) => Ok(GrantResult::AlreadyEnrolled),
            Err(error) => Err(error),
        }
    }
}

enum GrantResult {
    Created,
    AlreadyEnrolled,
}

fn map_gateway_error(error: PaymentGatewayError) -> ReconciliationError {
    ReconciliationError::GatewayUnavailable {
        message: error.to_string(),
    }
}

fn map_directory_error(error: UserDirectoryError) -> ReconciliationError {
    ReconciliationError::DirectoryUnavailable {
        message: error.to_string(),
    }
}

#[async_trait]
impl<G, R, U> ReconcileCommand for ReconciliationService<G, R, U>
where
    G: PaymentGateway + ?Sized,
    R: EnrollmentRepository + ?Sized,
    U: UserDirectory + ?Sized,
{
    async fn process(
        &self,
        event: PaymentEvent,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        if !RELEVANT_ACTIONS.contains(&event.action.as_str()) {
            info!(action = %event.action, "ignoring non-payment webhook action");
            return Ok(ReconciliationOutcome::Ignored {
                action: event.action,
            });
        }

        let payment = self
            .gateway
            .fetch_payment(&event.payment_id)
            .await
            .map_err(|error| {
                warn!(payment_id = %event.payment_id, %error, "payment lookup failed");
                map_gateway_error(error)
            })?;

        if !payment.status.is_approved() {
            info!(
                payment_id = %payment.id,
                status = %payment.status,
                "payment not approved; nothing to grant"
            );
            return Ok(ReconciliationOutcome::NotApproved {
                status: payment.status,
            });
        }

        let raw_reference = payment.external_reference.as_deref().ok_or_else(|| {
            ReconciliationError::MalformedReference {
                message: "approved payment carries no external reference".to_owned(),
            }
        })?;
        let reference = CorrelationReference::parse(raw_reference).map_err(|error| {
            warn!(payment_id = %payment.id, %error, "unparseable external reference");
            ReconciliationError::MalformedReference {
                message: error.to_string(),
            }
        })?;

        let user_id = reference.user_id().clone();
        let user = self
            .users
            .find_by_id(&user_id)
            .await
            .map_err(map_directory_error)?;
        if user.is_none() {
            warn!(payment_id = %payment.id, user_id = %user_id, "payment references unknown user");
            return Err(ReconciliationError::UnknownPayer { user_id });
        }

        let purchased_at = self.clock.utc();
        let requested = reference.course_ids().len();
        let mut granted = 0usize;
        let mut last_store_error = None;

        for course_id in reference.course_ids() {
            let enrollment = Enrollment {
                user_id: user_id.clone(),
                course_id: course_id.clone(),
                purchased_at,
            };
            match self.grant_course(&enrollment).await {
                Ok(GrantResult::Created) => {
                    info!(
                        payment_id = %payment.id,
                        user_id = %user_id,
                        course_id = %course_id,
                        "entitlement granted"
                    );
                    granted += 1;
                }
                Ok(GrantResult::AlreadyEnrolled) => {
                    info!(
                        payment_id = %payment.id,
                        user_id = %user_id,
                        course_id = %course_id,
                        "entitlement already held"
                    );
                    granted += 1;
                }
                Err(error) => {
                    warn!(
                        payment_id = %payment.id,
                        user_id = %user_id,
                        course_id = %course_id,
                        %error,
                        "entitlement write failed"
                    );
                    last_store_error = Some(error);
                }
            }
        }

        // Only a complete storage failure asks the provider to redeliver;
        // a partial grant would otherwise regrant on retry, which the
        // uniqueness constraint already makes safe.
        if granted == 0 {
            if let Some(error) = last_store_error {
                return Err(ReconciliationError::StoreUnavailable {
                    message: error.to_string(),
                });
            }
        }

        Ok(ReconciliationOutcome::Granted {
            user_id,
            granted,
            requested,
        })
    }
}
