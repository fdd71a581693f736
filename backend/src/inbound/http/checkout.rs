//! Checkout HTTP handler.
//!
//! ```text
//! POST /api/v1/checkout
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::{CheckoutError, CheckoutHandle, CheckoutRequest};
use crate::domain::Error;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    parse_course_id, require_finite_price, require_text, FieldName,
};
use crate::inbound::http::ApiResult;

/// Request payload for starting a checkout.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutRequestBody {
    /// Course to purchase.
    pub course_id: String,
    /// Title shown on the provider payment page.
    pub course_title: String,
    /// Listed price in BRL.
    #[schema(example = 49.9)]
    pub course_price: f64,
}

/// Response payload for a started checkout.
///
/// Exactly one of the two fields is populated, depending on the configured
/// checkout mode.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutResponseBody {
    /// Hosted checkout URL the browser should be redirected to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Preference id for the provider's embedded widget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference_id: Option<String>,
}

impl From<CheckoutHandle> for StartCheckoutResponseBody {
    fn from(handle: CheckoutHandle) -> Self {
        match handle {
            CheckoutHandle::Redirect { url } => Self {
                redirect_url: Some(url),
                preference_id: None,
            },
            CheckoutHandle::Widget { preference_id } => Self {
                redirect_url: None,
                preference_id: Some(preference_id),
            },
        }
    }
}

fn map_checkout_error(error: CheckoutError) -> Error {
    match error {
        CheckoutError::Unauthenticated => Error::unauthorized("login required"),
        CheckoutError::SelfPaymentNotAllowed { message } => {
            Error::invalid_request(message).with_details(json!({ "code": "self_payment" }))
        }
        CheckoutError::GatewayUnavailable { message } => Error::service_unavailable(message),
        CheckoutError::InvalidResponse { message } => {
            Error::internal(format!("provider response invalid: {message}"))
        }
    }
}

/// Start a provider checkout for the authenticated user.
#[utoipa::path(
    post,
    path = "/api/v1/checkout",
    request_body = StartCheckoutRequestBody,
    responses(
        (status = 200, description = "Checkout created", body = StartCheckoutResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 503, description = "Payment provider unavailable", body = ErrorSchema)
    ),
    tags = ["checkout"],
    security(("session_cookie" = []))
)]
#[post("/checkout")]
pub async fn start_checkout(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StartCheckoutRequestBody>,
) -> ApiResult<web::Json<StartCheckoutResponseBody>> {
    let user_id = session.require_user_id()?;
    let payload = payload.into_inner();

    let request = CheckoutRequest {
        user_id,
        course_id: parse_course_id(payload.course_id, FieldName::new("courseId"))?,
        course_title: require_text(payload.course_title, FieldName::new("courseTitle"))?,
        course_price: require_finite_price(payload.course_price, FieldName::new("coursePrice"))?,
    };

    let handle = state
        .checkout
        .start_checkout(request)
        .await
        .map_err(map_checkout_error)?;
    Ok(web::Json(handle.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureEnrollmentsQuery, FixtureReconcileCommand, MockCheckoutCommand,
    };
    use crate::domain::UserId;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};
    use std::sync::Arc;

    fn state_with(checkout: MockCheckoutCommand) -> HttpState {
        HttpState::new(
            Arc::new(checkout),
            Arc::new(FixtureReconcileCommand),
            Arc::new(FixtureEnrollmentsQuery),
            None,
        )
    }

    async fn call(
        state: HttpState,
        authenticated: bool,
        body: serde_json::Value,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/login",
                    web::get().to(|session: SessionContext| async move {
                        let id = UserId::new("user-1").expect("fixture id");
                        session.persist_user(&id)?;
                        Ok::<_, Error>(HttpResponse::Ok())
                    }),
                )
                .service(start_checkout),
        )
        .await;

        let mut request = test::TestRequest::post().uri("/checkout").set_json(&body);
        if authenticated {
            let login =
                test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
            let cookie = login
                .response()
                .cookies()
                .find(|cookie| cookie.name() == "session")
                .expect("session cookie set")
                .into_owned();
            request = request.cookie(cookie);
        }
        test::call_service(&app, request.to_request()).await
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "courseId": "course-1",
            "courseTitle": "Intro",
            "coursePrice": 49.9,
        })
    }

    #[actix_web::test]
    async fn returns_redirect_url_for_hosted_checkout() {
        let mut checkout = MockCheckoutCommand::new();
        checkout
            .expect_start_checkout()
            .withf(|req| req.user_id.as_str() == "user-1" && req.course_id.as_str() == "course-1")
            .returning(|_| {
                Ok(CheckoutHandle::Redirect {
                    url: "https://provider.invalid/pay/pref-1".to_owned(),
                })
            });

        let res = call(state_with(checkout), true, valid_body()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: StartCheckoutResponseBody = test::read_body_json(res).await;
        assert_eq!(
            body.redirect_url.as_deref(),
            Some("https://provider.invalid/pay/pref-1")
        );
        assert!(body.preference_id.is_none());
    }

    #[actix_web::test]
    async fn unauthenticated_requests_never_reach_the_gateway() {
        let mut checkout = MockCheckoutCommand::new();
        checkout.expect_start_checkout().never();

        let res = call(state_with(checkout), false, valid_body()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn invalid_course_id_is_a_bad_request() {
        let mut checkout = MockCheckoutCommand::new();
        checkout.expect_start_checkout().never();

        let body = json!({
            "courseId": "a|b",
            "courseTitle": "Intro",
            "coursePrice": 49.9,
        });
        let res = call(state_with(checkout), true, body).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn self_payment_is_a_bad_request() {
        let mut checkout = MockCheckoutCommand::new();
        checkout.expect_start_checkout().returning(|_| {
            Err(CheckoutError::SelfPaymentNotAllowed {
                message: "you cannot buy your own course".to_owned(),
            })
        });

        let res = call(state_with(checkout), true, valid_body()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let payload: Error = test::read_body_json(res).await;
        assert_eq!(payload.message(), "you cannot buy your own course");
    }

    #[actix_web::test]
    async fn gateway_failure_is_service_unavailable() {
        let mut checkout = MockCheckoutCommand::new();
        checkout.expect_start_checkout().returning(|_| {
            Err(CheckoutError::GatewayUnavailable {
                message: "connection refused".to_owned(),
            })
        });

        let res = call(state_with(checkout), true, valid_body()).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
