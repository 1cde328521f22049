//! Session extractors keeping token handling out of the handlers.
//!
//! A token is read from `Authorization: Bearer <token>` first and from the
//! session cookie second. Invalid or expired tokens never surface as errors:
//! the request is simply treated as anonymous and [`SessionUser`] rejects it
//! with `401 Unauthorized`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{Error, User};
use crate::inbound::http::cookies::SESSION_COOKIE;
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Raw token presented by the client, if any.
pub(crate) fn presented_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_owned());
    }
    req.cookie(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|token| !token.is_empty())
}

async fn resolve(req: HttpRequest) -> Result<Option<User>, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    let Some(token) = presented_token(&req) else {
        return Ok(None);
    };
    let user = state.auth.authenticate(&token).await;
    if user.is_none() {
        debug!(path = req.path(), "request carried an unusable session token");
    }
    Ok(user)
}

/// The authenticated caller. Extraction fails with `401` for anonymous
/// requests.
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

impl SessionUser {
    /// Unwrap the user.
    #[must_use]
    pub fn into_inner(self) -> User {
        self.0
    }
}

impl FromRequest for SessionUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            resolve(req)
                .await?
                .map(SessionUser)
                .ok_or_else(|| Error::unauthorized("authentication required"))
        })
    }
}

/// The caller when a valid session is presented, `None` otherwise.
#[derive(Debug, Clone, Default)]
pub struct MaybeSession(pub Option<User>);

impl MaybeSession {
    /// Borrow the user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

impl FromRequest for MaybeSession {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(req).await.map(MaybeSession) })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;

    use crate::inbound::http::test_utils::{TestContext, register_user};

    async fn whoami(user: SessionUser) -> HttpResponse {
        HttpResponse::Ok().body(user.into_inner().email.to_string())
    }

    async fn maybe(session: MaybeSession) -> HttpResponse {
        HttpResponse::Ok().body(session.user().map_or_else(
            || "anonymous".to_owned(),
            |user| user.email.to_string(),
        ))
    }

    #[rstest]
    fn bearer_header_wins_over_cookie() {
        let req = actix_test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer header-token"))
            .cookie(Cookie::new(SESSION_COOKIE, "cookie-token"))
            .to_http_request();
        assert_eq!(presented_token(&req).as_deref(), Some("header-token"));
    }

    #[rstest]
    #[case(Some("Basic abc"), Some("cookie-token"))]
    #[case(Some("Bearer   "), Some("cookie-token"))]
    #[case(None, Some("cookie-token"))]
    fn falls_back_to_cookie(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        let mut req = actix_test::TestRequest::default()
            .cookie(Cookie::new(SESSION_COOKIE, "cookie-token"));
        if let Some(header) = header {
            req = req.insert_header((AUTHORIZATION, header));
        }
        assert_eq!(presented_token(&req.to_http_request()).as_deref(), expected);
    }

    #[actix_web::test]
    async fn session_user_resolves_bearer_and_cookie_tokens() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .route("/whoami", web::get().to(whoami)),
        )
        .await;
        let session = register_user(&ctx, "Ada", "ada@example.com").await;

        let by_header = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, format!("Bearer {}", session.token)))
            .to_request();
        let body = actix_test::call_and_read_body(&app, by_header).await;
        assert_eq!(body, "ada@example.com");

        let by_cookie = actix_test::TestRequest::get()
            .uri("/whoami")
            .cookie(Cookie::new(SESSION_COOKIE, session.token.clone()))
            .to_request();
        let body = actix_test::call_and_read_body(&app, by_cookie).await;
        assert_eq!(body, "ada@example.com");
    }

    #[rstest]
    #[case(None)]
    #[case(Some("not-a-jwt"))]
    #[case(Some("deleted"))]
    #[actix_web::test]
    async fn unusable_tokens_are_unauthorised(#[case] token: Option<&str>) {
        let ctx = TestContext::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .route("/whoami", web::get().to(whoami))
                .route("/maybe", web::get().to(maybe)),
        )
        .await;
        let with_token = |uri: &str| {
            let req = actix_test::TestRequest::get().uri(uri);
            let req = match token {
                Some(token) => req.cookie(Cookie::new(SESSION_COOKIE, token.to_owned())),
                None => req,
            };
            req.to_request()
        };

        let response = actix_test::call_service(&app, with_token("/whoami")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = actix_test::call_and_read_body(&app, with_token("/maybe")).await;
        assert_eq!(body, "anonymous");
    }

    #[actix_web::test]
    async fn expired_tokens_are_ignored() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(ctx.state.clone())
                .route("/maybe", web::get().to(maybe)),
        )
        .await;
        let session = register_user(&ctx, "Ada", "ada@example.com").await;
        ctx.clock.set(session.expires_at);

        let request = actix_test::TestRequest::get()
            .uri("/maybe")
            .insert_header((AUTHORIZATION, format!("Bearer {}", session.token)))
            .to_request();
        let body = actix_test::call_and_read_body(&app, request).await;
        assert_eq!(body, "anonymous");
    }
}
