//! Domain services: one per resource family, each orchestrating validation,
//! identifier resolution and repository calls.

use std::sync::Arc;

use crate::domain::ports::{
    CategoryRepository, CommentRepository, PostRepository, SubscriberRepository, UserRepository,
};

mod auth;
mod categories;
mod comments;
mod errors;
mod lookup;
mod newsletter;
mod posts;
mod search;
mod stats;

pub use auth::AuthService;
pub use categories::CategoryService;
pub use comments::CommentService;
pub use newsletter::NewsletterService;
pub use posts::PostService;
pub use search::SearchService;
pub use stats::StatsService;

/// The repository ports every service draws from.
#[derive(Clone)]
pub struct BlogRepositories {
    /// User accounts.
    pub users: Arc<dyn UserRepository>,
    /// Posts, likes and counters.
    pub posts: Arc<dyn PostRepository>,
    /// Categories.
    pub categories: Arc<dyn CategoryRepository>,
    /// Comments.
    pub comments: Arc<dyn CommentRepository>,
    /// Newsletter subscribers.
    pub subscribers: Arc<dyn SubscriberRepository>,
}
