//! Cookie-session access for the buyer-facing endpoints.
//!
//! Checkout and enrollment listing both need exactly one thing from the
//! session: the logged-in buyer's id. [`SessionContext`] narrows the actix
//! session to that, so handlers never touch raw session keys.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

const USER_ID_KEY: &str = "user_id";

/// The request's session, narrowed to buyer identity.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Record the logged-in buyer in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id.as_str())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The logged-in buyer's id, or `401 Unauthorized` when absent.
    ///
    /// A stored value that no longer parses as a user id (stale cookie after
    /// an id-format change) is treated as a logged-out session rather than a
    /// server fault; logging in again mints a fresh cookie.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        let stored = self
            .0
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = stored else {
            return Err(Error::unauthorized("login required"));
        };
        UserId::new(&raw).map_err(|error| {
            warn!(%error, "session cookie carried an invalid user id");
            Error::unauthorized("login required")
        })
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(Self) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    use crate::inbound::http::test_utils::test_session_middleware;

    async fn login(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = UserId::new("student-7").expect("fixture id");
        session.persist_user(&id)?;
        Ok(HttpResponse::Ok().finish())
    }

    async fn whoami(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.as_str().to_owned()))
    }

    /// Write a raw session value the way a stale or corrupted cookie would.
    async fn poison(session: Session) -> HttpResponse {
        session
            .insert(USER_ID_KEY, "bad|id")
            .expect("insert raw session value");
        HttpResponse::Ok().finish()
    }

    fn session_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route("/login", web::get().to(login))
            .route("/poison", web::get().to(poison))
            .route("/whoami", web::get().to(whoami))
    }

    fn session_cookie(res: &actix_web::dev::ServiceResponse) -> actix_web::cookie::Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn persisted_buyer_id_round_trips() {
        let app = test::init_service(session_app()).await;
        let login_res =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&login_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(test::read_body(res).await, "student-7");
    }

    #[actix_web::test]
    async fn anonymous_sessions_are_unauthorised() {
        let app = test::init_service(session_app()).await;
        let res =
            test::call_service(&app, test::TestRequest::get().uri("/whoami").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unparseable_stored_ids_are_unauthorised() {
        let app = test::init_service(session_app()).await;
        let poison_res =
            test::call_service(&app, test::TestRequest::get().uri("/poison").to_request()).await;
        let cookie = session_cookie(&poison_res);

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/whoami")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
