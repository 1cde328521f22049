//! Response shapes shared by several endpoint modules.
//!
//! Domain types stay free of serde and utoipa; these DTOs own the camelCase
//! wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::category::{Category, CategorySummary};
use crate::domain::post::{PostDetails, PostMetrics};
use crate::domain::{AuthorSummary, User};

/// Account as returned by the auth endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "Ada Lovelace")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.to_string(),
            email: user.email.to_string(),
            avatar: user.avatar,
            created_at: user.created_at,
        }
    }
}

/// Public author details embedded in posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl From<AuthorSummary> for AuthorResponse {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id.to_string(),
            name: author.name,
            avatar: author.avatar,
        }
    }
}

/// Category reference embedded in posts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummaryResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<CategorySummary> for CategorySummaryResponse {
    fn from(category: CategorySummary) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            slug: category.slug,
        }
    }
}

/// View and like counters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResponse {
    pub views: u64,
    pub likes: u64,
}

impl From<PostMetrics> for MetricsResponse {
    fn from(metrics: PostMetrics) -> Self {
        Self {
            views: metrics.views,
            likes: metrics.likes,
        }
    }
}

/// A post with its author and category summaries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    #[schema(example = "hello-world")]
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub cover_image: String,
    /// Absent when the author account no longer exists.
    pub author: Option<AuthorResponse>,
    /// Absent when the category no longer exists.
    pub category: Option<CategorySummaryResponse>,
    pub tags: Vec<String>,
    #[schema(example = "published")]
    pub status: String,
    pub featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub metrics: MetricsResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDetails> for PostResponse {
    fn from(details: PostDetails) -> Self {
        let PostDetails {
            post,
            author,
            category,
        } = details;
        Self {
            id: post.id.to_string(),
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            cover_image: post.cover_image,
            author: author.map(AuthorResponse::from),
            category: category.map(CategorySummaryResponse::from),
            tags: post.tags,
            status: post.status.as_str().to_owned(),
            featured: post.featured,
            published_at: post.published_at,
            metrics: post.metrics.into(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// A category.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    #[schema(example = "engineering")]
    pub slug: String,
    pub description: Option<String>,
    pub icon: String,
    /// Parent category id.
    pub parent: Option<String>,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name,
            slug: category.slug,
            description: category.description,
            icon: category.icon,
            parent: category.parent.map(|parent| parent.to_string()),
            is_visible: category.is_visible,
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}

/// Confirmation body for deletions and sign-out.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Post deleted")]
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
