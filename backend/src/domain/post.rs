//! Blog posts: entity, validated inputs, list filters and sort order.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::category::CategorySummary;
use super::user::AuthorSummary;
use super::validation::{FieldErrors, contains_ignore_case, normalise_tags, text_in_range};
use super::{CategoryId, Error, PostId, UserId};

/// Cover image used when a post does not supply one.
pub const DEFAULT_COVER_IMAGE: &str = "/images/default-post.jpg";
/// Title bounds.
pub const TITLE_MIN: usize = 5;
/// Title bounds.
pub const TITLE_MAX: usize = 160;
/// Excerpt bounds.
pub const EXCERPT_MIN: usize = 10;
/// Excerpt bounds.
pub const EXCERPT_MAX: usize = 400;
/// Minimum trimmed content length.
pub const CONTENT_MIN: usize = 50;

/// Editorial state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PostStatus {
    /// Work in progress, visible to the author only.
    #[default]
    Draft,
    /// Awaiting review.
    Review,
    /// Publicly visible.
    Published,
    /// Retired from listings.
    Archived,
}

/// Error raised for unknown status strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("status must be one of draft, review, published, archived")]
pub struct InvalidPostStatus;

impl PostStatus {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Review => "review",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl FromStr for PostStatus {
    type Err = InvalidPostStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "review" => Ok(Self::Review),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(InvalidPostStatus),
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// View and like counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PostMetrics {
    /// Number of recorded views.
    pub views: u64,
    /// Number of users currently liking the post.
    pub likes: u64,
}

/// A stored post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Stable identifier.
    pub id: PostId,
    /// Trimmed title.
    pub title: String,
    /// Unique slug.
    pub slug: String,
    /// Short summary.
    pub excerpt: String,
    /// Body text.
    pub content: String,
    /// Cover image URL or path.
    pub cover_image: String,
    /// Author id.
    pub author: UserId,
    /// Owning category.
    pub category: CategoryId,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// Editorial status.
    pub status: PostStatus,
    /// Whether the post is promoted.
    pub featured: bool,
    /// Publication time, set while published.
    pub published_at: Option<DateTime<Utc>>,
    /// Counters.
    pub metrics: PostMetrics,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Published posts are public; anything else is visible to its author only.
    #[must_use]
    pub fn is_visible_to(&self, viewer: Option<&UserId>) -> bool {
        self.status == PostStatus::Published || viewer == Some(&self.author)
    }

    /// Set `status` and keep `published_at` consistent with it: publishing
    /// stamps `now` when no time is recorded, any other status clears it.
    pub fn apply_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == PostStatus::Published {
            self.published_at.get_or_insert(now);
        } else {
            self.published_at = None;
        }
    }
}

/// A post together with the author and category summaries shown in responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetails {
    /// The post itself.
    pub post: Post,
    /// Author summary, absent when the account no longer exists.
    pub author: Option<AuthorSummary>,
    /// Category summary, absent when the category no longer exists.
    pub category: Option<CategorySummary>,
}

/// Raw create payload as received from an inbound adapter.
#[derive(Debug, Clone, Default)]
pub struct PostInput {
    /// Title text.
    pub title: String,
    /// Excerpt text.
    pub excerpt: String,
    /// Body text.
    pub content: String,
    /// Category id or slug.
    pub category: String,
    /// Tags as supplied.
    pub tags: Vec<String>,
    /// Preferred slug.
    pub slug: Option<String>,
    /// Cover image.
    pub cover_image: Option<String>,
    /// Status name.
    pub status: Option<String>,
    /// Featured flag.
    pub featured: Option<bool>,
    /// Explicit publication time.
    pub published_at: Option<DateTime<Utc>>,
}

/// Create payload after field validation; the category is still unresolved.
#[derive(Debug, Clone)]
pub struct ValidatedPostInput {
    /// Trimmed title.
    pub title: String,
    /// Trimmed excerpt.
    pub excerpt: String,
    /// Trimmed content.
    pub content: String,
    /// Category id or slug.
    pub category: String,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// Preferred slug.
    pub slug: Option<String>,
    /// Cover image, defaulted.
    pub cover_image: String,
    /// Parsed status.
    pub status: PostStatus,
    /// Featured flag.
    pub featured: bool,
    /// Explicit publication time.
    pub published_at: Option<DateTime<Utc>>,
}

impl PostInput {
    /// Validate every field, reporting all failures together.
    pub fn validate(self) -> Result<ValidatedPostInput, Error> {
        let mut errors = FieldErrors::new();
        let title = errors.check(
            "title",
            text_in_range("title", &self.title, TITLE_MIN, Some(TITLE_MAX)),
        );
        let excerpt = errors.check(
            "excerpt",
            text_in_range("excerpt", &self.excerpt, EXCERPT_MIN, Some(EXCERPT_MAX)),
        );
        let content = errors.check(
            "content",
            text_in_range("content", &self.content, CONTENT_MIN, None),
        );
        let category = self.category.trim().to_owned();
        if category.is_empty() {
            errors.add("category", "category is required");
        }
        let status = match self.status.as_deref() {
            Some(raw) => errors.check("status", raw.parse::<PostStatus>()),
            None => Some(PostStatus::Draft),
        };
        errors.into_result()?;

        match (title, excerpt, content, status) {
            (Some(title), Some(excerpt), Some(content), Some(status)) => Ok(ValidatedPostInput {
                title,
                excerpt,
                content,
                category,
                tags: normalise_tags(&self.tags),
                slug: self.slug,
                cover_image: non_blank(self.cover_image)
                    .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_owned()),
                status,
                featured: self.featured.unwrap_or(false),
                published_at: self.published_at,
            }),
            _ => Err(Error::internal("post validation left fields unresolved")),
        }
    }
}

/// Partial update payload. Absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    /// New title.
    pub title: Option<String>,
    /// New excerpt.
    pub excerpt: Option<String>,
    /// New content.
    pub content: Option<String>,
    /// New category id or slug.
    pub category: Option<String>,
    /// Replacement tags.
    pub tags: Option<Vec<String>>,
    /// Explicit new slug.
    pub slug: Option<String>,
    /// New cover image.
    pub cover_image: Option<String>,
    /// New status name.
    pub status: Option<String>,
    /// New featured flag.
    pub featured: Option<bool>,
}

impl PostPatch {
    /// Apply the text and flag fields to `post`, re-validating the merged
    /// title, excerpt and content when any of them changed. Category, slug and
    /// status need repository or clock access and are handled by the caller;
    /// the parsed status is returned for that purpose.
    pub fn apply_fields(&self, post: &mut Post) -> Result<Option<PostStatus>, Error> {
        let mut errors = FieldErrors::new();
        let text_changed =
            self.title.is_some() || self.excerpt.is_some() || self.content.is_some();
        if text_changed {
            let title = self.title.as_deref().unwrap_or(&post.title);
            let excerpt = self.excerpt.as_deref().unwrap_or(&post.excerpt);
            let content = self.content.as_deref().unwrap_or(&post.content);
            let title = errors.check(
                "title",
                text_in_range("title", title, TITLE_MIN, Some(TITLE_MAX)),
            );
            let excerpt = errors.check(
                "excerpt",
                text_in_range("excerpt", excerpt, EXCERPT_MIN, Some(EXCERPT_MAX)),
            );
            let content = errors.check(
                "content",
                text_in_range("content", content, CONTENT_MIN, None),
            );
            if let (Some(title), Some(excerpt), Some(content)) = (title, excerpt, content) {
                post.title = title;
                post.excerpt = excerpt;
                post.content = content;
            }
        }
        if self
            .category
            .as_deref()
            .is_some_and(|category| category.trim().is_empty())
        {
            errors.add("category", "category is required");
        }
        let status = match self.status.as_deref() {
            Some(raw) => errors.check("status", raw.parse::<PostStatus>()),
            None => None,
        };
        errors.into_result()?;

        if let Some(tags) = &self.tags {
            post.tags = normalise_tags(tags);
        }
        if let Some(cover_image) = non_blank(self.cover_image.clone()) {
            post.cover_image = cover_image;
        }
        if let Some(featured) = self.featured {
            post.featured = featured;
        }
        Ok(status)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Column a post list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostSortKey {
    /// Publication time.
    PublishedAt,
    /// Creation time.
    CreatedAt,
    /// Last update time.
    UpdatedAt,
    /// Title, byte-wise.
    Title,
    /// View counter.
    Views,
    /// Like counter.
    Likes,
}

impl PostSortKey {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "publishedAt" => Some(Self::PublishedAt),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            "title" => Some(Self::Title),
            "views" => Some(Self::Views),
            "likes" => Some(Self::Likes),
            _ => None,
        }
    }
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first; missing values first.
    Asc,
    /// Largest first; missing values last.
    Desc,
}

/// Ordered list of sort keys. Ties after the last key break on post id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSort(Vec<(PostSortKey, SortDirection)>);

impl Default for PostSort {
    fn default() -> Self {
        Self(vec![(PostSortKey::PublishedAt, SortDirection::Desc)])
    }
}

impl PostSort {
    /// Single-key sort.
    #[must_use]
    pub fn by(key: PostSortKey, direction: SortDirection) -> Self {
        Self(vec![(key, direction)])
    }

    /// Parse a comma-separated sort expression such as `-publishedAt,title`.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::post::{PostSort, PostSortKey, SortDirection};
    ///
    /// let sort = PostSort::parse("-views, title").unwrap();
    /// assert_eq!(
    ///     sort.keys(),
    ///     &[
    ///         (PostSortKey::Views, SortDirection::Desc),
    ///         (PostSortKey::Title, SortDirection::Asc),
    ///     ]
    /// );
    /// assert!(PostSort::parse("password").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut keys = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            let (direction, name) = match part.strip_prefix('-') {
                Some(name) => (SortDirection::Desc, name),
                None => (SortDirection::Asc, part.strip_prefix('+').unwrap_or(part)),
            };
            let key = PostSortKey::parse(name).ok_or_else(|| {
                super::validation::field_error("sort", format!("unknown sort key: {name}"))
            })?;
            keys.push((key, direction));
        }
        if keys.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self(keys))
    }

    /// Keys in priority order.
    #[must_use]
    pub fn keys(&self) -> &[(PostSortKey, SortDirection)] {
        &self.0
    }

    /// Compare two posts under this ordering.
    #[must_use]
    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        self.0
            .iter()
            .map(|(key, direction)| compare_key(*key, *direction, a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    }
}

fn compare_key(key: PostSortKey, direction: SortDirection, a: &Post, b: &Post) -> Ordering {
    let ordering = match key {
        PostSortKey::PublishedAt => {
            return compare_optional(a.published_at, b.published_at, direction);
        }
        PostSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
        PostSortKey::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        PostSortKey::Title => a.title.cmp(&b.title),
        PostSortKey::Views => a.metrics.views.cmp(&b.metrics.views),
        PostSortKey::Likes => a.metrics.likes.cmp(&b.metrics.likes),
    };
    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

fn compare_optional<T: Ord>(a: Option<T>, b: Option<T>, direction: SortDirection) -> Ordering {
    match (a, b, direction) {
        (Some(a), Some(b), SortDirection::Asc) => a.cmp(&b),
        (Some(a), Some(b), SortDirection::Desc) => b.cmp(&a),
        (None, None, _) => Ordering::Equal,
        (None, Some(_), SortDirection::Asc) | (Some(_), None, SortDirection::Desc) => {
            Ordering::Less
        }
        (None, Some(_), SortDirection::Desc) | (Some(_), None, SortDirection::Asc) => {
            Ordering::Greater
        }
    }
}

/// Filters applied to a post listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Restrict to one status; `None` means every status.
    pub status: Option<PostStatus>,
    /// Restrict to one author.
    pub author: Option<UserId>,
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Restrict to posts carrying this (lowercase) tag.
    pub tag: Option<String>,
    /// Case-insensitive substring over title, excerpt and content.
    pub search: Option<String>,
    /// Only featured posts.
    pub featured_only: bool,
}

impl PostFilter {
    /// Whether `post` passes every filter.
    #[must_use]
    pub fn matches(&self, post: &Post) -> bool {
        self.status.is_none_or(|status| post.status == status)
            && self.author.is_none_or(|author| post.author == author)
            && self.category.is_none_or(|category| post.category == category)
            && self
                .tag
                .as_ref()
                .is_none_or(|tag| post.tags.iter().any(|t| t == tag))
            && self.search.as_deref().is_none_or(|term| {
                contains_ignore_case(&post.title, term)
                    || contains_ignore_case(&post.excerpt, term)
                    || contains_ignore_case(&post.content, term)
            })
            && (!self.featured_only || post.featured)
    }
}

/// One page of a post listing as requested from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Filters.
    pub filter: PostFilter,
    /// Ordering.
    pub sort: PostSort,
    /// Rows to skip.
    pub offset: u64,
    /// Rows to return.
    pub limit: u32,
}

/// Raw list parameters as received from an inbound adapter.
#[derive(Debug, Clone, Default)]
pub struct PostListParams {
    /// Status name, `all`, or absent for `published`.
    pub status: Option<String>,
    /// Category id or slug.
    pub category: Option<String>,
    /// Tag filter.
    pub tag: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    /// `true` restricts to featured posts.
    pub featured: Option<bool>,
    /// Sort expression.
    pub sort: Option<String>,
}

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeOutcome {
    /// Whether the caller now likes the post.
    pub liked: bool,
    /// Like count after the toggle.
    pub like_count: u64,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    #[fixture]
    fn post() -> Post {
        Post {
            id: PostId::random(),
            title: "A valid title".to_owned(),
            slug: "a-valid-title".to_owned(),
            excerpt: "A sufficiently long excerpt".to_owned(),
            content: "x".repeat(CONTENT_MIN),
            cover_image: DEFAULT_COVER_IMAGE.to_owned(),
            author: UserId::random(),
            category: CategoryId::random(),
            tags: vec!["rust".to_owned()],
            status: PostStatus::Draft,
            featured: false,
            published_at: None,
            metrics: PostMetrics::default(),
            created_at: at(1),
            updated_at: at(1),
        }
    }

    fn input() -> PostInput {
        PostInput {
            title: "  Hello world  ".to_owned(),
            excerpt: "An excerpt long enough".to_owned(),
            content: "c".repeat(CONTENT_MIN),
            category: "news".to_owned(),
            tags: vec!["Rust".to_owned(), "rust".to_owned(), " ".to_owned()],
            ..PostInput::default()
        }
    }

    #[rstest]
    fn validate_trims_and_defaults() {
        let valid = input().validate().expect("valid input");
        assert_eq!(valid.title, "Hello world");
        assert_eq!(valid.tags, vec!["rust".to_owned()]);
        assert_eq!(valid.cover_image, DEFAULT_COVER_IMAGE);
        assert_eq!(valid.status, PostStatus::Draft);
        assert!(!valid.featured);
    }

    #[rstest]
    fn validate_collects_all_field_errors() {
        let err = PostInput {
            title: "abc".to_owned(),
            excerpt: "short".to_owned(),
            content: "tiny".to_owned(),
            category: "  ".to_owned(),
            status: Some("bogus".to_owned()),
            ..PostInput::default()
        }
        .validate()
        .expect_err("invalid input");
        let fields = &err.details().expect("details")["fields"];
        for field in ["title", "excerpt", "content", "category", "status"] {
            assert!(fields.get(field).is_some(), "missing {field}");
        }
    }

    #[rstest]
    fn visibility_depends_on_status_and_viewer(mut post: Post) {
        let author = post.author;
        let stranger = UserId::random();
        assert!(post.is_visible_to(Some(&author)));
        assert!(!post.is_visible_to(Some(&stranger)));
        assert!(!post.is_visible_to(None));
        post.status = PostStatus::Published;
        assert!(post.is_visible_to(None));
    }

    #[rstest]
    fn apply_status_manages_published_at(mut post: Post) {
        post.apply_status(PostStatus::Published, at(5));
        assert_eq!(post.published_at, Some(at(5)));
        post.apply_status(PostStatus::Published, at(6));
        assert_eq!(post.published_at, Some(at(5)));
        post.apply_status(PostStatus::Archived, at(7));
        assert_eq!(post.published_at, None);
    }

    #[rstest]
    fn patch_revalidates_merged_text(mut post: Post) {
        let patch = PostPatch {
            title: Some("abc".to_owned()),
            ..PostPatch::default()
        };
        let err = patch.apply_fields(&mut post).expect_err("short title");
        assert!(err.details().expect("details")["fields"].get("title").is_some());
        assert_eq!(post.title, "A valid title");
    }

    #[rstest]
    fn patch_updates_tags_and_flags(mut post: Post) {
        let patch = PostPatch {
            tags: Some(vec!["Async".to_owned()]),
            featured: Some(true),
            status: Some("review".to_owned()),
            ..PostPatch::default()
        };
        let status = patch.apply_fields(&mut post).expect("valid patch");
        assert_eq!(status, Some(PostStatus::Review));
        assert_eq!(post.tags, vec!["async".to_owned()]);
        assert!(post.featured);
    }

    #[rstest]
    #[case("", PostSort::default())]
    #[case("title", PostSort::by(PostSortKey::Title, SortDirection::Asc))]
    #[case("+likes", PostSort::by(PostSortKey::Likes, SortDirection::Asc))]
    #[case("-createdAt", PostSort::by(PostSortKey::CreatedAt, SortDirection::Desc))]
    fn sort_parsing(#[case] raw: &str, #[case] expected: PostSort) {
        assert_eq!(PostSort::parse(raw).expect("valid sort"), expected);
    }

    #[rstest]
    fn unknown_sort_keys_are_rejected() {
        let err = PostSort::parse("-publishedAt,secret").expect_err("unknown key");
        assert!(err.message().contains("validation failed"));
    }

    #[rstest]
    fn missing_published_at_sorts_last_descending(post: Post) {
        let mut published = post.clone();
        published.id = PostId::random();
        published.published_at = Some(at(3));
        let draft = post;

        let desc = PostSort::by(PostSortKey::PublishedAt, SortDirection::Desc);
        assert_eq!(desc.compare(&published, &draft), Ordering::Less);
        let asc = PostSort::by(PostSortKey::PublishedAt, SortDirection::Asc);
        assert_eq!(asc.compare(&published, &draft), Ordering::Greater);
    }

    #[rstest]
    fn ties_break_on_id(post: Post) {
        let mut other = post.clone();
        other.id = PostId::random();
        let sort = PostSort::by(PostSortKey::Views, SortDirection::Desc);
        assert_eq!(sort.compare(&post, &other), post.id.cmp(&other.id));
    }

    #[rstest]
    fn filter_matches_search_and_tag(mut post: Post) {
        post.status = PostStatus::Published;
        let filter = PostFilter {
            status: Some(PostStatus::Published),
            tag: Some("rust".to_owned()),
            search: Some("VALID".to_owned()),
            ..PostFilter::default()
        };
        assert!(filter.matches(&post));

        let featured = PostFilter {
            featured_only: true,
            ..PostFilter::default()
        };
        assert!(!featured.matches(&post));
    }
}
