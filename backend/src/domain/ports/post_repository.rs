//! Port for post persistence, likes, view counters and post aggregates.

use async_trait::async_trait;

use crate::domain::post::{LikeOutcome, Post, PostQuery, PostStatus};
use crate::domain::search::TagCount;
use crate::domain::{CategoryId, PostId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post repository adapters.
    pub enum PostPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "post repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "post repository query failed: {message}",
        /// Another post already owns the slug.
        DuplicateSlug { slug: String } => "post slug already in use: {slug}",
    }
}

/// Storage of posts together with their like sets and counters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// One page of posts matching `query`, plus the total match count.
    async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), PostPersistenceError>;

    /// Fetch a post by id.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError>;

    /// Fetch a post by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, PostPersistenceError>;

    /// Whether a post other than `exclude` owns `slug`.
    async fn slug_taken(
        &self,
        slug: &str,
        exclude: Option<PostId>,
    ) -> Result<bool, PostPersistenceError>;

    /// Store a new post.
    async fn insert(&self, post: &Post) -> Result<(), PostPersistenceError>;

    /// Overwrite the editable fields of an existing post. Counters are left
    /// untouched.
    async fn update(&self, post: &Post) -> Result<(), PostPersistenceError>;

    /// Delete a post with its comments and likes. Returns `false` when the
    /// post did not exist.
    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError>;

    /// Add or remove `user`'s like. `None` when the post does not exist.
    async fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> Result<Option<LikeOutcome>, PostPersistenceError>;

    /// Increment the view counter and return the new value. `None` when the
    /// post does not exist.
    async fn increment_views(&self, id: &PostId) -> Result<Option<u64>, PostPersistenceError>;

    /// Published posts other than `post` in the same category that share at
    /// least one tag with it (any tag when it has none), newest first.
    async fn related(&self, post: &Post, limit: u32) -> Result<Vec<Post>, PostPersistenceError>;

    /// Published posts whose title, excerpt or a tag contains `term`
    /// (case-insensitive, literal), newest first.
    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Post>, PostPersistenceError>;

    /// Tags of published posts containing `term`, most used first.
    async fn tag_counts(&self, term: &str, limit: u32)
    -> Result<Vec<TagCount>, PostPersistenceError>;

    /// Number of posts, optionally restricted to one status.
    async fn count(&self, status: Option<PostStatus>) -> Result<u64, PostPersistenceError>;

    /// Number of posts in any status referencing `category`.
    async fn count_in_category(&self, category: &CategoryId)
    -> Result<u64, PostPersistenceError>;

    /// Published post counts per category, largest first.
    async fn published_per_category(
        &self,
    ) -> Result<Vec<(CategoryId, u64)>, PostPersistenceError>;
}
