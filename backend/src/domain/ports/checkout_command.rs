//! Port abstraction for starting a checkout.
//!
//! The HTTP layer depends on this trait rather than on the concrete checkout
//! service so handlers can be tested against mocks and fixtures.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CourseId, UserId};

/// Errors surfaced to callers starting a checkout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// No authenticated user is associated with the request.
    #[error("checkout requires an authenticated user")]
    Unauthenticated,
    /// The buyer owns the course being purchased.
    #[error("{message}")]
    SelfPaymentNotAllowed {
        /// Human-readable explanation for the client.
        message: String,
    },
    /// The payment provider could not be reached or rejected the request.
    #[error("payment provider unavailable: {message}")]
    GatewayUnavailable {
        /// Diagnostic description of the provider failure.
        message: String,
    },
    /// The provider responded with a body the service cannot use.
    #[error("payment provider returned an invalid response: {message}")]
    InvalidResponse {
        /// Diagnostic description of the decoding failure.
        message: String,
    },
}

/// Inputs for starting a checkout on behalf of an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    /// Authenticated buying user.
    pub user_id: UserId,
    /// Course being purchased.
    pub course_id: CourseId,
    /// Title shown on the provider payment page.
    pub course_title: String,
    /// Listed price in BRL.
    pub course_price: f64,
}

/// Handle the client uses to continue the payment flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutHandle {
    /// Redirect the browser to the provider's hosted checkout.
    Redirect {
        /// Hosted checkout URL.
        url: String,
    },
    /// Mount the provider's embedded widget with this preference.
    Widget {
        /// Provider preference identifier.
        preference_id: String,
    },
}

/// Port for the checkout initiation use case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckoutCommand: Send + Sync {
    /// Create a provider checkout for the given purchase.
    async fn start_checkout(&self, request: CheckoutRequest)
        -> Result<CheckoutHandle, CheckoutError>;
}

/// Fixture implementation returning a canned redirect.
#[derive(Debug, Default)]
pub struct FixtureCheckoutCommand;

#[async_trait]
impl CheckoutCommand for FixtureCheckoutCommand {
    async fn start_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutHandle, CheckoutError> {
        Ok(CheckoutHandle::Redirect {
            url: format!("https://checkout.invalid/pay/{}", request.course_id),
        })
    }
}
