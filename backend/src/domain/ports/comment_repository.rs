//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::CommentId;
use crate::domain::comment::{Comment, CommentFilter, CommentStatus};

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment repository adapters.
    pub enum CommentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "comment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "comment repository query failed: {message}",
    }
}

/// Storage of threaded comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// One page of comments matching `filter`, newest first, plus the total.
    async fn list(
        &self,
        filter: &CommentFilter,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Comment>, u64), CommentPersistenceError>;

    /// Approved direct replies of every comment in `parents`, oldest first.
    async fn approved_replies(
        &self,
        parents: &[CommentId],
    ) -> Result<Vec<Comment>, CommentPersistenceError>;

    /// Fetch a comment by id.
    async fn find_by_id(&self, id: &CommentId)
    -> Result<Option<Comment>, CommentPersistenceError>;

    /// Store a new comment.
    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError>;

    /// Overwrite content, status and timestamps of an existing comment.
    async fn update(&self, comment: &Comment) -> Result<(), CommentPersistenceError>;

    /// Delete a comment and its replies. Returns `false` when it did not exist.
    async fn delete(&self, id: &CommentId) -> Result<bool, CommentPersistenceError>;

    /// Number of comments with `status`.
    async fn count_with_status(&self, status: CommentStatus)
    -> Result<u64, CommentPersistenceError>;
}
