//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{PasswordHasher, SessionTokens};
use crate::domain::services::{
    AuthService, BlogRepositories, CategoryService, CommentService, NewsletterService,
    PostService, SearchService, StatsService,
};
use crate::inbound::http::cookies::SessionCookieConfig;

/// Parameter object bundling the driven ports behind the services.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Repository bundle.
    pub repositories: BlogRepositories,
    /// Password hashing adapter.
    pub hasher: Arc<dyn PasswordHasher>,
    /// Session token adapter.
    pub tokens: Arc<dyn SessionTokens>,
    /// Time source for timestamps and token expiry.
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub auth: AuthService,
    pub posts: PostService,
    pub categories: CategoryService,
    pub comments: CommentService,
    pub newsletter: NewsletterService,
    pub search: SearchService,
    pub stats: StatsService,
    pub cookies: SessionCookieConfig,
}

impl HttpState {
    /// Build every service from one set of ports.
    pub fn new(ports: HttpStatePorts, cookies: SessionCookieConfig) -> Self {
        let HttpStatePorts {
            repositories,
            hasher,
            tokens,
            clock,
        } = ports;
        Self {
            auth: AuthService::new(
                Arc::clone(&repositories.users),
                hasher,
                tokens,
                Arc::clone(&clock),
            ),
            posts: PostService::new(repositories.clone(), Arc::clone(&clock)),
            categories: CategoryService::new(repositories.clone(), Arc::clone(&clock)),
            comments: CommentService::new(repositories.clone(), Arc::clone(&clock)),
            newsletter: NewsletterService::new(
                Arc::clone(&repositories.subscribers),
                Arc::clone(&clock),
            ),
            search: SearchService::new(repositories.clone()),
            stats: StatsService::new(repositories),
            cookies,
        }
    }
}
