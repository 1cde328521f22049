//! PostgreSQL persistence adapters using Diesel with `diesel-async` and
//! `bb8` pooling.
//!
//! Repositories only translate between Diesel row structs and domain types;
//! row structs (`models.rs`) and table definitions (`schema.rs`) never leave
//! this module. Constraint violations that carry domain meaning (duplicate
//! slugs or emails, categories still referenced by posts) are recognised by
//! constraint name and surfaced as the matching port error variants.
//!
//! ```no_run
//! use blog_backend::outbound::persistence::{DbPool, DieselPostRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/blog")).await?;
//! let posts = DieselPostRepository::new(pool);
//! # let _ = posts;
//! # Ok(())
//! # }
//! ```

mod diesel_category_repository;
mod diesel_comment_repository;
mod diesel_error_mapping;
mod diesel_helpers;
mod diesel_post_repository;
mod diesel_subscriber_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

use std::sync::Arc;

use crate::domain::services::BlogRepositories;

pub use diesel_category_repository::DieselCategoryRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_post_repository::DieselPostRepository;
pub use diesel_subscriber_repository::DieselSubscriberRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};

/// Bundle every Diesel repository over one shared pool.
pub fn diesel_repositories(pool: &DbPool) -> BlogRepositories {
    BlogRepositories {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        posts: Arc::new(DieselPostRepository::new(pool.clone())),
        categories: Arc::new(DieselCategoryRepository::new(pool.clone())),
        comments: Arc::new(DieselCommentRepository::new(pool.clone())),
        subscribers: Arc::new(DieselSubscriberRepository::new(pool.clone())),
    }
}
