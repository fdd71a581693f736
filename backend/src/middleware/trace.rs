//! Request-scoped trace identifiers.
//!
//! Every request handled by [`Trace`] gets a fresh [`TraceId`] held in tokio
//! task-local storage and echoed in a `trace-id` response header, so a
//! provider webhook redelivery or a support ticket can be matched to its log
//! lines. `domain::Error` reads the active identifier when it is built, which
//! is how error payloads end up carrying the same id as the header.
//!
//! Task-locals are not inherited by `tokio::spawn`; wrap spawned work in
//! [`TraceId::scope`] if it must log under the request's identifier.

use std::future::Future;
use std::task::{Context, Poll};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::Error;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tokio::task_local;
use uuid::Uuid;

task_local! {
    static ACTIVE_TRACE: TraceId;
}

/// Identifier correlating log lines, response headers, and error payloads
/// for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceId(Uuid);

impl TraceId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The identifier of the request being handled, when inside one.
    pub fn current() -> Option<Self> {
        ACTIVE_TRACE.try_with(|id| *id).ok()
    }

    /// Run `fut` with this identifier as the active trace.
    pub async fn scope<F: Future>(self, fut: F) -> F::Output {
        ACTIVE_TRACE.scope(self, fut).await
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Middleware assigning each request a [`TraceId`] and echoing it in the
/// `trace-id` response header.
#[derive(Clone)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service produced by wrapping an app in [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = TraceId::new();
        let fut = self.service.call(req);
        Box::pin(trace_id.scope(async move {
            let mut res = fut.await?;
            // A hyphenated UUID is always a valid header value.
            if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
                res.response_mut()
                    .headers_mut()
                    .insert(HeaderName::from_static("trace-id"), value);
            }
            Ok(res)
        }))
    }
}
