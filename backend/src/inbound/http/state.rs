//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CheckoutCommand, EnrollmentsQuery, ReconcileCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Checkout initiation use case.
    pub checkout: Arc<dyn CheckoutCommand>,
    /// Webhook reconciliation use case.
    pub reconciliation: Arc<dyn ReconcileCommand>,
    /// Enrollment listing use case.
    pub enrollments: Arc<dyn EnrollmentsQuery>,
    /// Shared secret the provider must present on webhook calls, when set.
    pub webhook_token: Option<String>,
}

impl HttpState {
    /// Construct state from the port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use coursepay::domain::ports::{
    ///     FixtureCheckoutCommand, FixtureEnrollmentsQuery, FixtureReconcileCommand,
    /// };
    /// use coursepay::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(
    ///     Arc::new(FixtureCheckoutCommand),
    ///     Arc::new(FixtureReconcileCommand),
    ///     Arc::new(FixtureEnrollmentsQuery),
    ///     None,
    /// );
    /// let _checkout = state.checkout.clone();
    /// ```
    pub fn new(
        checkout: Arc<dyn CheckoutCommand>,
        reconciliation: Arc<dyn ReconcileCommand>,
        enrollments: Arc<dyn EnrollmentsQuery>,
        webhook_token: Option<String>,
    ) -> Self {
        Self {
            checkout,
            reconciliation,
            enrollments,
            webhook_token,
        }
    }
}
