//! Dashboard statistics endpoint.

use actix_web::{get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::stats::{CategoryStat, DashboardStats, Overview, PostHighlight};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub total_posts: u64,
    pub published_posts: u64,
    /// Approved comments only.
    pub total_comments: u64,
    pub total_users: u64,
}

impl From<Overview> for OverviewResponse {
    fn from(overview: Overview) -> Self {
        Self {
            total_posts: overview.total_posts,
            published_posts: overview.published_posts,
            total_comments: overview.total_comments,
            total_users: overview.total_users,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostHighlightResponse {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub views: u64,
    pub likes: u64,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<PostHighlight> for PostHighlightResponse {
    fn from(post: PostHighlight) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title,
            slug: post.slug,
            views: post.views,
            likes: post.likes,
            published_at: post.published_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStatResponse {
    pub category_id: String,
    /// Published posts in the category.
    pub count: u64,
    pub name: String,
    /// Absent when the category no longer exists.
    pub slug: Option<String>,
}

impl From<CategoryStat> for CategoryStatResponse {
    fn from(stat: CategoryStat) -> Self {
        Self {
            category_id: stat.category_id.to_string(),
            count: stat.count,
            name: stat.name,
            slug: stat.slug,
        }
    }
}

/// Dashboard figures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub overview: OverviewResponse,
    /// Most viewed published posts.
    pub popular_posts: Vec<PostHighlightResponse>,
    /// Most recently published posts.
    pub latest_posts: Vec<PostHighlightResponse>,
    pub category_stats: Vec<CategoryStatResponse>,
}

impl From<DashboardStats> for StatsResponse {
    fn from(dashboard: DashboardStats) -> Self {
        Self {
            overview: dashboard.overview.into(),
            popular_posts: dashboard
                .popular_posts
                .into_iter()
                .map(PostHighlightResponse::from)
                .collect(),
            latest_posts: dashboard
                .latest_posts
                .into_iter()
                .map(PostHighlightResponse::from)
                .collect(),
            category_stats: dashboard
                .category_stats
                .into_iter()
                .map(CategoryStatResponse::from)
                .collect(),
        }
    }
}

/// Blog-wide statistics.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = StatsResponse),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["stats"],
    operation_id = "stats",
    security([])
)]
#[get("/stats")]
pub async fn stats(state: web::Data<HttpState>) -> ApiResult<web::Json<StatsResponse>> {
    let dashboard = state.stats.dashboard().await?;
    Ok(web::Json(dashboard.into()))
}
