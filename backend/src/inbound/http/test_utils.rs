//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::TimeDelta;

use crate::domain::{IssuedSession, Registration};
use crate::inbound::http::api_scope;
use crate::inbound::http::cookies::SessionCookieConfig;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::memory::MemoryBlogStore;
use crate::outbound::security::{BcryptPasswordHasher, JwtSessionTokens, MIN_PASSWORD_COST};
use crate::test_support::{MutableClock, fixture_instant, memory_repositories};

const TEST_SECRET: &[u8] = b"test-secret-that-is-long-enough-for-hs256";

/// HTTP state over a fresh in-memory store and a controllable clock.
pub struct TestContext {
    pub state: web::Data<HttpState>,
    pub clock: Arc<MutableClock>,
    pub store: Arc<MemoryBlogStore>,
}

impl TestContext {
    /// Build a context with the cheapest bcrypt cost and insecure cookies.
    pub fn new() -> Self {
        let (store, repositories) = memory_repositories();
        let clock = Arc::new(MutableClock::new(fixture_instant()));
        let ttl = TimeDelta::days(7);
        let ports = HttpStatePorts {
            repositories,
            hasher: Arc::new(BcryptPasswordHasher::new(MIN_PASSWORD_COST)),
            tokens: Arc::new(JwtSessionTokens::new(TEST_SECRET, ttl)),
            clock: clock.clone(),
        };
        let cookies = SessionCookieConfig {
            secure: false,
            ..SessionCookieConfig::default()
        };
        Self {
            state: web::Data::new(HttpState::new(ports, cookies)),
            clock,
            store,
        }
    }
}

/// Application exposing the versioned API over `ctx`.
pub fn test_app(
    ctx: &TestContext,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new().app_data(ctx.state.clone()).service(api_scope())
}

/// Register an account directly through the auth service.
pub async fn register_user(ctx: &TestContext, name: &str, email: &str) -> IssuedSession {
    let registration =
        Registration::try_from_parts(name, email, "secret1", "secret1").expect("valid registration");
    let (_, session) = ctx
        .state
        .auth
        .register(registration)
        .await
        .expect("registration succeeds");
    session
}

/// `Authorization` header value for `session`.
pub fn bearer(session: &IssuedSession) -> (actix_web::http::header::HeaderName, String) {
    (
        actix_web::http::header::AUTHORIZATION,
        format!("Bearer {}", session.token),
    )
}
