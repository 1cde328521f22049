//! Builders for the HTTP state and its repository bundle.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use blog_backend::domain::services::BlogRepositories;
use blog_backend::inbound::http::state::{HttpState, HttpStatePorts};
use blog_backend::outbound::memory::MemoryBlogStore;
use blog_backend::outbound::persistence::diesel_repositories;
use blog_backend::outbound::security::{BcryptPasswordHasher, JwtSessionTokens};

use super::ServerConfig;

/// Select repositories backed by `pool` when present, otherwise a fresh
/// in-memory store.
fn select_repositories<Pool>(
    pool: &Option<Pool>,
    make_repositories: impl FnOnce(&Pool) -> BlogRepositories,
) -> BlogRepositories {
    match pool {
        Some(pool) => make_repositories(pool),
        None => {
            warn!("no database configured; content is kept in memory and lost on restart");
            Arc::new(MemoryBlogStore::default()).repositories()
        }
    }
}

/// Build the shared HTTP state from the server configuration.
pub fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let repositories = select_repositories(&config.db_pool, diesel_repositories);
    let ports = HttpStatePorts {
        repositories,
        hasher: Arc::new(BcryptPasswordHasher::new(config.password_cost)),
        tokens: Arc::new(JwtSessionTokens::new(
            &config.session.secret,
            config.session_ttl,
        )),
        clock: Arc::new(mockable::DefaultClock),
    };
    web::Data::new(HttpState::new(ports, config.cookie_config()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use std::cell::Cell;
    use std::net::SocketAddr;

    use actix_web::cookie::SameSite;
    use blog_backend::domain::Registration;
    use blog_backend::inbound::http::session_config::SessionSettings;
    use blog_backend::outbound::security::MIN_PASSWORD_COST;
    use chrono::TimeDelta;
    use rstest::rstest;
    use zeroize::Zeroizing;

    fn config() -> ServerConfig {
        let session = SessionSettings {
            secret: Zeroizing::new(b"state-builder-secret-with-enough-bytes".to_vec()),
            cookie_secure: false,
            same_site: SameSite::Strict,
        };
        let bind_addr: SocketAddr = "127.0.0.1:0".parse().expect("address");
        ServerConfig::new(bind_addr, session, TimeDelta::hours(3), MIN_PASSWORD_COST)
    }

    #[rstest]
    fn pool_present_uses_supplied_repositories() {
        let invoked = Cell::new(false);
        let _ = select_repositories(&Some(()), |_| {
            invoked.set(true);
            Arc::new(MemoryBlogStore::default()).repositories()
        });
        assert!(invoked.get());
    }

    #[rstest]
    fn pool_absent_falls_back_to_memory() {
        let invoked = Cell::new(false);
        let _ = select_repositories::<()>(&None, |_| {
            invoked.set(true);
            Arc::new(MemoryBlogStore::default()).repositories()
        });
        assert!(!invoked.get());
    }

    #[rstest]
    fn cookie_attributes_follow_config() {
        let state = build_http_state(&config());
        assert!(!state.cookies.secure);
        assert_eq!(state.cookies.same_site, SameSite::Strict);
        assert_eq!(state.cookies.ttl, TimeDelta::hours(3));
    }

    #[tokio::test]
    async fn memory_state_issues_verifiable_sessions() {
        let state = build_http_state(&config());
        let registration =
            Registration::try_from_parts("Ada", "ada@example.com", "secret1", "secret1")
                .expect("valid registration");

        let (user, session) = state
            .auth
            .register(registration)
            .await
            .expect("registration succeeds");
        let resolved = state
            .auth
            .authenticate(&session.token)
            .await
            .expect("token resolves");
        assert_eq!(resolved.id, user.id);
    }
}
