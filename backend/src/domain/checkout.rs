//! Checkout initiation service.
//!
//! Builds the correlation reference for a purchase, asks the payment gateway
//! for a checkout preference, and returns the handle matching the configured
//! checkout mode.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{
    CheckoutCommand, CheckoutError, CheckoutHandle, CheckoutRequest, PaymentGateway,
    PaymentGatewayError, PurchaseIntentRequest,
};
use super::reference::CorrelationReference;

/// Which provider integration the frontend uses to collect payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutMode {
    /// Redirect the browser to the provider's hosted page.
    #[default]
    HostedRedirect,
    /// Return a preference id for the provider's embedded widget.
    EmbeddedWidget,
}

/// Checkout initiation use case.
pub struct CheckoutService<G: ?Sized> {
    gateway: Arc<G>,
    back_url: String,
    mode: CheckoutMode,
}

impl<G> CheckoutService<G>
where
    G: PaymentGateway + ?Sized,
{
    /// Build the service around a gateway and the application's public URL.
    pub fn new(gateway: Arc<G>, back_url: impl Into<String>, mode: CheckoutMode) -> Self {
        Self {
            gateway,
            back_url: back_url.into(),
            mode,
        }
    }
}

fn map_gateway_error(error: PaymentGatewayError) -> CheckoutError {
    match error {
        PaymentGatewayError::SelfPayment { .. } => CheckoutError::SelfPaymentNotAllowed {
            message: "you cannot buy your own course".to_owned(),
        },
        PaymentGatewayError::Transport { message }
        | PaymentGatewayError::Timeout { message } => {
            CheckoutError::GatewayUnavailable { message }
        }
        PaymentGatewayError::Rejected { status, message } => CheckoutError::GatewayUnavailable {
            message: format!("provider returned {status}: {message}"),
        },
        PaymentGatewayError::Decode { message } => CheckoutError::InvalidResponse { message },
    }
}

#[async_trait]
impl<G> CheckoutCommand for CheckoutService<G>
where
    G: PaymentGateway + ?Sized,
{
    async fn start_checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutHandle, CheckoutError> {
        let reference =
            CorrelationReference::single(request.user_id.clone(), request.course_id.clone());

        let intent_request = PurchaseIntentRequest {
            course_id: request.course_id.clone(),
            course_title: request.course_title,
            amount: request.course_price,
            payer_user_id: request.user_id.clone(),
            back_url: self.back_url.clone(),
            reference: reference.encode(),
        };

        let intent = self
            .gateway
            .create_purchase_intent(&intent_request)
            .await
            .map_err(|error| {
                warn!(
                    user_id = %request.user_id,
                    course_id = %request.course_id,
                    %error,
                    "checkout preference creation failed"
                );
                map_gateway_error(error)
            })?;

        info!(
            user_id = %request.user_id,
            course_id = %request.course_id,
            preference_id = %intent.preference_id,
            "checkout preference created"
        );

        Ok(match self.mode {
            CheckoutMode::HostedRedirect => CheckoutHandle::Redirect {
                url: intent.redirect_url,
            },
            CheckoutMode::EmbeddedWidget => CheckoutHandle::Widget {
                preference_id: intent.preference_id,
            },
        })
    }
}
