//! Threaded post comments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::user::AuthorSummary;
use super::validation::text_in_range;
use super::{CommentId, PostId, UserId};

/// Content bounds.
pub const CONTENT_MIN: usize = 3;
/// Content bounds.
pub const CONTENT_MAX: usize = 2000;

/// Moderation state of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CommentStatus {
    /// Awaiting moderation.
    Pending,
    /// Publicly listed.
    #[default]
    Approved,
    /// Flagged as spam.
    Spam,
}

/// Error raised for unknown status strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be one of pending, approved, spam")]
pub struct InvalidCommentStatus;

impl CommentStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Spam => "spam",
        }
    }
}

impl FromStr for CommentStatus {
    type Err = InvalidCommentStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "spam" => Ok(Self::Spam),
            _ => Err(InvalidCommentStatus),
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Stable identifier.
    pub id: CommentId,
    /// Trimmed body.
    pub content: String,
    /// Writer.
    pub author: UserId,
    /// Post the comment belongs to.
    pub post: PostId,
    /// Comment this one replies to.
    pub parent: Option<CommentId>,
    /// Moderation state.
    pub status: CommentStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Validate comment text, returning the trimmed value.
pub fn validate_content(content: &str) -> Result<String, String> {
    text_in_range("content", content, CONTENT_MIN, Some(CONTENT_MAX))
}

/// A comment with its author summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentView {
    /// The comment.
    pub comment: Comment,
    /// Author summary, absent when the account no longer exists.
    pub author: Option<AuthorSummary>,
}

/// A listed comment with its approved replies, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentThread {
    /// The comment itself.
    pub comment: CommentView,
    /// Approved direct replies.
    pub replies: Vec<CommentView>,
}

/// Which comments a listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentFilter {
    /// Owning post.
    pub post: PostId,
    /// `None` lists top-level comments; `Some` lists replies of that comment.
    pub parent: Option<CommentId>,
    /// Required status.
    pub status: CommentStatus,
}

impl CommentFilter {
    /// Whether `comment` passes the filter.
    #[must_use]
    pub fn matches(&self, comment: &Comment) -> bool {
        comment.post == self.post && comment.parent == self.parent && comment.status == self.status
    }
}

/// Raw update payload.
#[derive(Debug, Clone, Default)]
pub struct CommentPatch {
    /// New body text.
    pub content: Option<String>,
    /// New status name.
    pub status: Option<String>,
}
