//! Payment provider webhook endpoint.
//!
//! ```text
//! POST    /api/v1/payments/webhook
//! OPTIONS /api/v1/payments/webhook
//! ```
//!
//! The provider delivers notifications at least once and retries on 5xx
//! responses, so the status code is the retry contract: acknowledged and
//! permanently unprocessable events return 2xx/4xx, transient failures 5xx.
//!
//! The provider's delivery agent is a cross-origin caller, so every response
//! on this surface carries permissive CORS headers, including error bodies.

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::{Method, StatusCode};
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use utoipa::ToSchema;

use crate::domain::ports::{PaymentEvent, ReconciliationError, ReconciliationOutcome};
use crate::domain::{Error, PaymentId};
use crate::inbound::http::state::HttpState;

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
    ("Access-Control-Allow-Methods", "POST, OPTIONS"),
];

/// Wire shape of a provider notification.
///
/// Every field is optional at the transport level so a malformed body maps to
/// a controlled 400 instead of a framework-generated deserialisation error.
#[derive(Debug, Deserialize, ToSchema)]
struct WebhookBody {
    /// Kind of provider event, e.g. `payment.updated`.
    action: Option<String>,
    #[schema(inline)]
    data: Option<WebhookData>,
}

#[derive(Debug, Deserialize, ToSchema)]
struct WebhookData {
    // The provider sends numeric ids on some topics and strings on others.
    #[schema(value_type = Option<String>)]
    id: Option<Value>,
}

/// Acknowledgement payload returned for processed notifications.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAckBody {
    /// Human-readable summary of what the delivery did.
    pub message: String,
    /// Courses granted in this pass, when a grant ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted: Option<usize>,
    /// Courses named by the payment, when a grant ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<usize>,
}

fn with_cors(mut response: HttpResponse) -> HttpResponse {
    let headers = response.headers_mut();
    for (name, value) in CORS_HEADERS {
        if let (Ok(name), Ok(value)) = (
            actix_web::http::header::HeaderName::try_from(name),
            actix_web::http::header::HeaderValue::try_from(value),
        ) {
            headers.insert(name, value);
        }
    }
    response
}

fn error_response(error: &Error) -> HttpResponse {
    with_cors(error.error_response())
}

fn extract_payment_id(data: Option<WebhookData>) -> Option<String> {
    match data?.id? {
        Value::String(id) => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn authorize(request: &HttpRequest, expected_token: Option<&str>) -> Result<(), Error> {
    let Some(expected) = expected_token else {
        return Ok(());
    };
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented == Some(expected) {
        Ok(())
    } else {
        Err(Error::unauthorized("invalid webhook credentials"))
    }
}

fn ack(outcome: ReconciliationOutcome) -> WebhookAckBody {
    match outcome {
        ReconciliationOutcome::Ignored { action } => WebhookAckBody {
            message: format!("ignored action: {action}"),
            granted: None,
            requested: None,
        },
        ReconciliationOutcome::NotApproved { status } => WebhookAckBody {
            message: format!("payment not approved: {status}"),
            granted: None,
            requested: None,
        },
        ReconciliationOutcome::Granted {
            user_id,
            granted,
            requested,
        } => WebhookAckBody {
            message: format!("granted {granted} of {requested} courses to {user_id}"),
            granted: Some(granted),
            requested: Some(requested),
        },
    }
}

fn map_reconciliation_error(error: ReconciliationError) -> Error {
    match error {
        ReconciliationError::MalformedReference { message } => Error::invalid_request(message),
        ReconciliationError::UnknownPayer { user_id } => {
            Error::invalid_request(format!("payment references unknown user {user_id}"))
        }
        ReconciliationError::GatewayUnavailable { message }
        | ReconciliationError::DirectoryUnavailable { message }
        | ReconciliationError::StoreUnavailable { message } => {
            Error::service_unavailable(message)
        }
    }
}

/// Receive a provider payment notification.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    request_body = inline(WebhookBody),
    responses(
        (status = 200, description = "Notification processed", body = WebhookAckBody),
        (status = 400, description = "Malformed or unprocessable notification"),
        (status = 401, description = "Invalid webhook credentials"),
        (status = 503, description = "Transient failure; the provider should redeliver")
    ),
    tags = ["webhook"]
)]
pub async fn receive_notification(
    state: web::Data<HttpState>,
    request: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    if let Err(error) = authorize(&request, state.webhook_token.as_deref()) {
        return error_response(&error);
    }

    let parsed: WebhookBody = match serde_json::from_slice(&body) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(%error, "unparseable webhook body");
            return error_response(&Error::invalid_request("request body must be JSON"));
        }
    };

    let Some(action) = parsed.action else {
        return error_response(&Error::invalid_request("missing required field: action"));
    };
    let Some(raw_id) = extract_payment_id(parsed.data) else {
        return error_response(&Error::invalid_request("missing required field: data.id"));
    };
    let payment_id = match PaymentId::new(&raw_id) {
        Ok(id) => id,
        Err(error) => {
            return error_response(&Error::invalid_request(error.to_string()));
        }
    };

    let event = PaymentEvent { action, payment_id };
    match state.reconciliation.process(event).await {
        Ok(outcome) => with_cors(HttpResponse::Ok().json(ack(outcome))),
        Err(error) => error_response(&map_reconciliation_error(error)),
    }
}

async fn preflight() -> HttpResponse {
    with_cors(HttpResponse::build(StatusCode::NO_CONTENT).finish())
}

async fn method_not_allowed() -> HttpResponse {
    with_cors(HttpResponse::MethodNotAllowed().finish())
}

/// Register the webhook routes.
///
/// The resource is registered manually so OPTIONS preflights and unsupported
/// methods get explicit responses with CORS headers instead of framework
/// defaults.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/payments/webhook")
            .route(web::post().to(receive_notification))
            .route(web::method(Method::OPTIONS).to(preflight))
            .default_service(web::to(method_not_allowed)),
    );
}
