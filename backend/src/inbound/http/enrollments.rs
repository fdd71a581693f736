//! Enrollment listing HTTP handler.
//!
//! ```text
//! GET /api/v1/enrollments
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Enrollment;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// A single entitlement in the listing response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBody {
    /// Course the user may access.
    pub course_id: String,
    /// When the purchase was reconciled, RFC 3339.
    #[schema(format = "date-time")]
    pub purchased_at: String,
}

/// Response payload listing the authenticated user's entitlements.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListEnrollmentsResponseBody {
    /// Entitlements held by the user.
    pub enrollments: Vec<EnrollmentBody>,
}

impl From<Enrollment> for EnrollmentBody {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            course_id: enrollment.course_id.to_string(),
            purchased_at: enrollment.purchased_at.to_rfc3339(),
        }
    }
}

/// List the authenticated user's course entitlements.
#[utoipa::path(
    get,
    path = "/api/v1/enrollments",
    responses(
        (status = 200, description = "Enrollments listed", body = ListEnrollmentsResponseBody),
        (status = 401, description = "Unauthorized", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["enrollments"],
    security(("session_cookie" = []))
)]
#[get("/enrollments")]
pub async fn list_enrollments(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ListEnrollmentsResponseBody>> {
    let user_id = session.require_user_id()?;
    let enrollments = state.enrollments.list_for_user(&user_id).await?;
    Ok(web::Json(ListEnrollmentsResponseBody {
        enrollments: enrollments.into_iter().map(EnrollmentBody::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        FixtureCheckoutCommand, FixtureReconcileCommand, MockEnrollmentsQuery,
    };
    use crate::domain::{CourseId, Error, UserId};
    use actix_web::http::StatusCode;
    use actix_web::{test, App, HttpResponse};
    use chrono::Utc;
    use std::sync::Arc;

    fn state_with(enrollments: MockEnrollmentsQuery) -> HttpState {
        HttpState::new(
            Arc::new(FixtureCheckoutCommand),
            Arc::new(FixtureReconcileCommand),
            Arc::new(enrollments),
            None,
        )
    }

    async fn call(state: HttpState, authenticated: bool) -> actix_web::dev::ServiceResponse {
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
                .service(list_enrollments),
        )
        .await;

        let mut request = test::TestRequest::get().uri("/enrollments");
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

    #[actix_web::test]
    async fn lists_the_callers_enrollments() {
        let mut enrollments = MockEnrollmentsQuery::new();
        enrollments
            .expect_list_for_user()
            .withf(|user_id| user_id.as_str() == "user-1")
            .returning(|user_id| {
                Ok(vec![Enrollment {
                    user_id: user_id.clone(),
                    course_id: CourseId::new("course-1").expect("fixture id"),
                    purchased_at: Utc::now(),
                }])
            });

        let res = call(state_with(enrollments), true).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: ListEnrollmentsResponseBody = test::read_body_json(res).await;
        assert_eq!(body.enrollments.len(), 1);
        assert_eq!(body.enrollments[0].course_id, "course-1");
    }

    #[actix_web::test]
    async fn unauthenticated_listing_is_rejected() {
        let mut enrollments = MockEnrollmentsQuery::new();
        enrollments.expect_list_for_user().never();

        let res = call(state_with(enrollments), false).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn store_failure_surfaces_as_service_unavailable() {
        let mut enrollments = MockEnrollmentsQuery::new();
        enrollments
            .expect_list_for_user()
            .returning(|_| Err(Error::service_unavailable("enrollment store unavailable")));

        let res = call(state_with(enrollments), true).await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
