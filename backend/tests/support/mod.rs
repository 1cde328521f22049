//! Shared helpers for backend integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`, so
//! the in-memory application wiring lives here instead of being repeated in
//! each file.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, web};
use chrono::TimeDelta;

use blog_backend::Trace;
use blog_backend::inbound::http::api_scope;
use blog_backend::inbound::http::cookies::SessionCookieConfig;
use blog_backend::inbound::http::state::{HttpState, HttpStatePorts};
use blog_backend::outbound::security::{
    BcryptPasswordHasher, JwtSessionTokens, MIN_PASSWORD_COST,
};
use blog_backend::test_support::{MutableClock, fixture_instant, memory_repositories};

const SECRET: &[u8] = b"integration-secret-that-is-long-enough";

/// HTTP state over a fresh in-memory store.
pub struct Harness {
    pub state: web::Data<HttpState>,
    pub clock: Arc<MutableClock>,
}

impl Harness {
    pub fn new() -> Self {
        let (_store, repositories) = memory_repositories();
        let clock = Arc::new(MutableClock::new(fixture_instant()));
        let ports = HttpStatePorts {
            repositories,
            hasher: Arc::new(BcryptPasswordHasher::new(MIN_PASSWORD_COST)),
            tokens: Arc::new(JwtSessionTokens::new(SECRET, TimeDelta::days(7))),
            clock: clock.clone(),
        };
        let cookies = SessionCookieConfig {
            secure: false,
            ..SessionCookieConfig::default()
        };
        Self {
            state: web::Data::new(HttpState::new(ports, cookies)),
            clock,
        }
    }

    /// Application with tracing middleware and the versioned API.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .service(api_scope())
    }
}

/// `name=value` pair of the session cookie set by `response`.
pub fn session_cookie(response: &ServiceResponse) -> String {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("auth_token="))
        .and_then(|value| value.split(';').next())
        .expect("session cookie")
        .to_owned()
}
