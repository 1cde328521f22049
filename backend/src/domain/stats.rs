//! Dashboard statistics.

use chrono::{DateTime, Utc};

use super::{CategoryId, PostId};

/// Posts listed in the popular and latest sections.
pub const HIGHLIGHT_LIMIT: u32 = 5;
/// Name reported for posts whose category no longer exists.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Site-wide counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Overview {
    /// Posts in any status.
    pub total_posts: u64,
    /// Published posts.
    pub published_posts: u64,
    /// Approved comments.
    pub total_comments: u64,
    /// Registered users.
    pub total_users: u64,
}

/// Compact post entry used by the highlight sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostHighlight {
    /// Post id.
    pub id: PostId,
    /// Title.
    pub title: String,
    /// Slug.
    pub slug: String,
    /// View count.
    pub views: u64,
    /// Like count.
    pub likes: u64,
    /// Publication time.
    pub published_at: Option<DateTime<Utc>>,
}

/// Published posts per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStat {
    /// Category id.
    pub category_id: CategoryId,
    /// Number of published posts.
    pub count: u64,
    /// Category name, or [`UNKNOWN_CATEGORY`].
    pub name: String,
    /// Category slug, absent for unknown categories.
    pub slug: Option<String>,
}

/// Everything the stats endpoint reports.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardStats {
    /// Counters.
    pub overview: Overview,
    /// Most viewed published posts.
    pub popular_posts: Vec<PostHighlight>,
    /// Most recently published posts.
    pub latest_posts: Vec<PostHighlight>,
    /// Published posts per category, largest first.
    pub category_stats: Vec<CategoryStat>,
}
