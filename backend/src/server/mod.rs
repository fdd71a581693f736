//! HTTP server assembly.
//!
//! Wires the domain services to their adapters based on [`ServerConfig`] and
//! runs the actix-web server. Production deployments provide a database URL
//! and provider credentials; local development falls back to in-memory stores
//! and the fixture gateway so the API can be exercised end to end without
//! external services.

pub mod config;

use std::sync::Arc;

use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::SameSite;
use actix_web::{web, App, HttpServer};
use mockable::{Clock, DefaultClock};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    EnrollmentRepository, FixturePaymentGateway, FixtureUserDirectory,
    InMemoryEnrollmentRepository, PaymentGateway, UserDirectory,
};
use crate::domain::{CheckoutService, EnrollmentQueryService, ReconciliationService};
use crate::inbound::http::checkout::start_checkout;
use crate::inbound::http::enrollments::list_enrollments;
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::webhook;
use crate::outbound::mercado_pago::MercadoPagoGateway;
use crate::outbound::persistence::{
    DbPool, DieselEnrollmentRepository, DieselUserDirectory, PoolConfig,
};
use crate::Trace;
use self::config::ServerConfig;

fn to_io_error(context: &str, error: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {error}"))
}

/// Build the payment gateway adapter from configuration.
fn build_gateway(config: &ServerConfig) -> std::io::Result<Arc<dyn PaymentGateway>> {
    match &config.access_token {
        Some(token) => {
            let gateway = MercadoPagoGateway::new(
                config.provider_base_url.clone(),
                token,
                config.notification_url(),
            )
            .map_err(|error| to_io_error("failed to build payment gateway client", error))?;
            Ok(Arc::new(gateway))
        }
        None => Ok(Arc::new(FixturePaymentGateway)),
    }
}

/// Build the persistence adapters, preferring PostgreSQL when configured.
async fn build_stores(
    config: &ServerConfig,
) -> std::io::Result<(Arc<dyn EnrollmentRepository>, Arc<dyn UserDirectory>)> {
    match &config.database_url {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|error| to_io_error("failed to build database pool", error))?;
            Ok((
                Arc::new(DieselEnrollmentRepository::new(pool.clone())),
                Arc::new(DieselUserDirectory::new(pool)),
            ))
        }
        None => Ok((
            Arc::new(InMemoryEnrollmentRepository::new()),
            Arc::new(FixtureUserDirectory),
        )),
    }
}

/// Assemble the handler state from configuration.
async fn build_http_state(config: &ServerConfig) -> std::io::Result<HttpState> {
    let gateway = build_gateway(config)?;
    let (enrollments, users) = build_stores(config).await?;
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let checkout = CheckoutService::new(
        Arc::clone(&gateway),
        config.app_base_url.clone(),
        config.checkout_mode,
    );
    let reconciliation = ReconciliationService::new(
        gateway,
        Arc::clone(&enrollments),
        users,
        clock,
    );
    let query = EnrollmentQueryService::new(enrollments);

    Ok(HttpState::new(
        Arc::new(checkout),
        Arc::new(reconciliation),
        Arc::new(query),
        config.webhook_token.clone(),
    ))
}

/// Run the HTTP server until shutdown.
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let state = build_http_state(&server_config).await?;
    let health_state = web::Data::new(HealthState::new());
    // Clone for server factory so readiness probe remains accessible.
    let server_health_state = health_state.clone();
    let key = server_config.session.key.clone();
    let cookie_secure = server_config.session.cookie_secure;

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(SameSite::Lax)
            .build();

        let api = web::scope("/api/v1")
            .wrap(session)
            .service(start_checkout)
            .service(list_enrollments)
            .configure(webhook::configure);

        let app = App::new()
            .app_data(server_health_state.clone())
            .app_data(web::Data::new(state.clone()))
            .wrap(Trace)
            .service(api)
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(server_config.bind_addr.as_str())?;

    info!(addr = %server_config.bind_addr, "server listening");
    health_state.mark_ready();
    server.run().await
}
