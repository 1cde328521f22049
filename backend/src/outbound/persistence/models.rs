//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer. Conversions into domain
//! types re-validate stored values and report corrupt rows as messages the
//! repositories turn into query errors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::category::Category;
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::newsletter::Subscriber;
use crate::domain::post::{Post, PostMetrics, PostStatus};
use crate::domain::{
    CategoryId, CommentId, Email, PostId, StoredCredentials, SubscriberId, User, UserId, UserName,
};

use super::schema::{categories, comments, post_likes, posts, subscribers, users};

/// Convert a stored counter, clamping corrupt negative values to zero.
pub(crate) fn count_from_db(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Convert a domain counter for storage.
pub(crate) fn count_to_db(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_credentials(self) -> Result<StoredCredentials, String> {
        let user = User {
            id: UserId::from_uuid(self.id),
            name: UserName::new(&self.name).map_err(|err| format!("user {}: {err}", self.id))?,
            email: Email::new(&self.email).map_err(|err| format!("user {}: {err}", self.id))?,
            avatar: self.avatar,
            created_at: self.created_at,
        };
        Ok(StoredCredentials {
            user,
            password_hash: self.password_hash,
        })
    }

    pub(crate) fn into_user(self) -> Result<User, String> {
        self.into_credentials().map(|credentials| credentials.user)
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub avatar: &'a str,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewUserRow<'a> {
    pub(crate) fn new(user: &'a User, password_hash: &'a str) -> Self {
        Self {
            id: *user.id.as_uuid(),
            name: user.name.as_ref(),
            email: user.email.as_ref(),
            password_hash,
            avatar: &user.avatar,
            created_at: user.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, QueryableByName)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub tags: Vec<String>,
    pub status: String,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = String;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status: PostStatus = row
            .status
            .parse()
            .map_err(|_| format!("post {} has unknown status {}", row.id, row.status))?;
        Ok(Self {
            id: PostId::from_uuid(row.id),
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            cover_image: row.cover_image,
            author: UserId::from_uuid(row.author_id),
            category: CategoryId::from_uuid(row.category_id),
            tags: row.tags,
            status,
            featured: row.featured,
            published_at: row.published_at,
            metrics: PostMetrics {
                views: count_from_db(row.views),
                likes: count_from_db(row.likes),
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub(crate) struct NewPostRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub slug: &'a str,
    pub excerpt: &'a str,
    pub content: &'a str,
    pub cover_image: &'a str,
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub tags: &'a [String],
    pub status: &'a str,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub views: i64,
    pub likes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Post> for NewPostRow<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            id: *post.id.as_uuid(),
            title: &post.title,
            slug: &post.slug,
            excerpt: &post.excerpt,
            content: &post.content,
            cover_image: &post.cover_image,
            author_id: *post.author.as_uuid(),
            category_id: *post.category.as_uuid(),
            tags: &post.tags,
            status: post.status.as_str(),
            featured: post.featured,
            published_at: post.published_at,
            views: count_to_db(post.metrics.views),
            likes: count_to_db(post.metrics.likes),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Editable post columns. Counters and ownership are never overwritten.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PostUpdate<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub excerpt: &'a str,
    pub content: &'a str,
    pub cover_image: &'a str,
    pub category_id: Uuid,
    pub tags: &'a [String],
    pub status: &'a str,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Post> for PostUpdate<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            title: &post.title,
            slug: &post.slug,
            excerpt: &post.excerpt,
            content: &post.content,
            cover_image: &post.cover_image,
            category_id: *post.category.as_uuid(),
            tags: &post.tags,
            status: post.status.as_str(),
            featured: post.featured,
            published_at: post.published_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = post_likes)]
pub(crate) struct NewPostLikeRow {
    pub post_id: Uuid,
    pub user_id: Uuid,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: String,
    pub parent_id: Option<Uuid>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            icon: row.icon,
            parent: row.parent_id.map(CategoryId::from_uuid),
            is_visible: row.is_visible,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Full category row, used for inserts and as a changeset.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = categories)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CategoryChanges<'a> {
    pub name: &'a str,
    pub slug: &'a str,
    pub description: Option<&'a str>,
    pub icon: &'a str,
    pub parent_id: Option<Uuid>,
    pub is_visible: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Category> for CategoryChanges<'a> {
    fn from(category: &'a Category) -> Self {
        Self {
            name: &category.name,
            slug: &category.slug,
            description: category.description.as_deref(),
            icon: &category.icon,
            parent_id: category.parent.map(|parent| *parent.as_uuid()),
            is_visible: category.is_visible,
            updated_at: category.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = categories)]
pub(crate) struct NewCategoryRow<'a> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[diesel(embed)]
    pub changes: CategoryChanges<'a>,
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub content: String,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CommentRow> for Comment {
    type Error = String;

    fn try_from(row: CommentRow) -> Result<Self, Self::Error> {
        let status: CommentStatus = row
            .status
            .parse()
            .map_err(|_| format!("comment {} has unknown status {}", row.id, row.status))?;
        Ok(Self {
            id: CommentId::from_uuid(row.id),
            content: row.content,
            author: UserId::from_uuid(row.author_id),
            post: PostId::from_uuid(row.post_id),
            parent: row.parent_id.map(CommentId::from_uuid),
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub id: Uuid,
    pub content: &'a str,
    pub author_id: Uuid,
    pub post_id: Uuid,
    pub parent_id: Option<Uuid>,
    pub status: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Comment> for NewCommentRow<'a> {
    fn from(comment: &'a Comment) -> Self {
        Self {
            id: *comment.id.as_uuid(),
            content: &comment.content,
            author_id: *comment.author.as_uuid(),
            post_id: *comment.post.as_uuid(),
            parent_id: comment.parent.map(|parent| *parent.as_uuid()),
            status: comment.status.as_str(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = comments)]
pub(crate) struct CommentUpdate<'a> {
    pub content: &'a str,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscribers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriberRow {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SubscriberRow> for Subscriber {
    type Error = String;

    fn try_from(row: SubscriberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SubscriberId::from_uuid(row.id),
            email: Email::new(&row.email).map_err(|err| format!("subscriber {}: {err}", row.id))?,
            name: row.name,
            tags: row.tags,
            confirmed_at: row.confirmed_at,
            unsubscribed_at: row.unsubscribed_at,
            created_at: row.created_at,
        })
    }
}

/// Full subscriber row, used for inserts and as a changeset.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = subscribers)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct SubscriberChanges<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub tags: &'a [String],
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Subscriber> for SubscriberChanges<'a> {
    fn from(subscriber: &'a Subscriber) -> Self {
        Self {
            email: subscriber.email.as_ref(),
            name: subscriber.name.as_deref(),
            tags: &subscriber.tags,
            confirmed_at: subscriber.confirmed_at,
            unsubscribed_at: subscriber.unsubscribed_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscribers)]
pub(crate) struct NewSubscriberRow<'a> {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    #[diesel(embed)]
    pub changes: SubscriberChanges<'a>,
}
