//! Port abstraction for the payment provider.
//!
//! The [`PaymentGateway`] trait covers the two provider operations the
//! platform needs: creating a checkout preference for a purchase and fetching
//! a payment by identifier during webhook reconciliation.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CourseId, Payment, PaymentId, PaymentStatus, UserId};

/// Errors raised by payment gateway adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentGatewayError {
    /// The provider could not be reached.
    #[error("payment gateway transport failed: {message}")]
    Transport {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The provider did not respond within the configured deadline.
    #[error("payment gateway timed out: {message}")]
    Timeout {
        /// Adapter-supplied failure description.
        message: String,
    },
    /// The provider returned a non-success status.
    #[error("payment gateway rejected the request ({status}): {message}")]
    Rejected {
        /// HTTP status code returned by the provider.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },
    /// The provider refused the preference because payer and collector match.
    #[error("payer and collector must be different accounts: {message}")]
    SelfPayment {
        /// Truncated response body for diagnostics.
        message: String,
    },
    /// The provider responded with a body this adapter cannot decode.
    #[error("payment gateway response could not be decoded: {message}")]
    Decode {
        /// Adapter-supplied failure description.
        message: String,
    },
}

impl PaymentGatewayError {
    /// Build a [`PaymentGatewayError::Transport`] with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Build a [`PaymentGatewayError::Timeout`] with the given message.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Build a [`PaymentGatewayError::Rejected`] with the given status and message.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Build a [`PaymentGatewayError::SelfPayment`] with the given message.
    pub fn self_payment(message: impl Into<String>) -> Self {
        Self::SelfPayment {
            message: message.into(),
        }
    }

    /// Build a [`PaymentGatewayError::Decode`] with the given message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Inputs for creating a provider checkout preference.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseIntentRequest {
    /// Course being purchased.
    pub course_id: CourseId,
    /// Title shown on the provider's payment page.
    pub course_title: String,
    /// Price in BRL. Adapters floor this to the provider minimum.
    pub amount: f64,
    /// Buying user, forwarded as the payer identity.
    pub payer_user_id: UserId,
    /// Base URL the provider redirects back to after payment.
    pub back_url: String,
    /// Encoded correlation reference attached as `external_reference`.
    pub reference: String,
}

/// A checkout preference created at the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseIntent {
    /// Provider preference identifier, used by the embedded widget.
    pub preference_id: String,
    /// Hosted checkout URL for redirect flows.
    pub redirect_url: String,
}

/// Port for the payment provider.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a checkout preference for the given purchase.
    async fn create_purchase_intent(
        &self,
        request: &PurchaseIntentRequest,
    ) -> Result<PurchaseIntent, PaymentGatewayError>;

    /// Fetch a payment by provider identifier.
    async fn fetch_payment(&self, id: &PaymentId) -> Result<Payment, PaymentGatewayError>;
}

/// Fixture implementation returning canned provider responses.
///
/// Use it in tests and local development where provider behaviour is not
/// under test. Fetched payments report as approved with no reference.
#[derive(Debug, Default)]
pub struct FixturePaymentGateway;

#[async_trait]
impl PaymentGateway for FixturePaymentGateway {
    async fn create_purchase_intent(
        &self,
        request: &PurchaseIntentRequest,
    ) -> Result<PurchaseIntent, PaymentGatewayError> {
        Ok(PurchaseIntent {
            preference_id: format!("fixture-preference-{}", request.course_id),
            redirect_url: format!(
                "https://checkout.invalid/preferences/fixture-preference-{}",
                request.course_id
            ),
        })
    }

    async fn fetch_payment(&self, id: &PaymentId) -> Result<Payment, PaymentGatewayError> {
        Ok(Payment {
            id: id.clone(),
            status: PaymentStatus::Approved,
            external_reference: None,
        })
    }
}
