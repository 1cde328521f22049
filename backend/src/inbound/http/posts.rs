//! Post endpoints.
//!
//! ```text
//! GET    /api/v1/posts?status=published&category=rust&sort=-views&page=2
//! POST   /api/v1/posts
//! GET    /api/v1/posts/{idOrSlug}
//! PUT    /api/v1/posts/{idOrSlug}
//! DELETE /api/v1/posts/{idOrSlug}
//! GET    /api/v1/posts/{idOrSlug}/related?limit=3
//! POST   /api/v1/posts/{idOrSlug}/like
//! POST   /api/v1/posts/{idOrSlug}/view
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{PageDefaults, PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::post::{PostInput, PostListParams, PostPatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{MessageResponse, PostResponse};
use crate::inbound::http::schemas::PostPageSchema;
use crate::inbound::http::session::{MaybeSession, SessionUser};
use crate::inbound::http::state::HttpState;

/// Query string accepted by the post listing.
///
/// Values stay textual so unusual input reaches the domain validation
/// instead of failing extraction.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// `published` (default), `draft`, `archived` or `all`.
    pub status: Option<String>,
    /// Category id or slug.
    pub category: Option<String>,
    pub tag: Option<String>,
    /// Case-insensitive text match over title, excerpt and content.
    pub search: Option<String>,
    /// `true` restricts the list to featured posts.
    pub featured: Option<String>,
    /// Comma-separated sort keys, `-` prefix for descending.
    #[param(example = "-publishedAt")]
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PostListQuery {
    fn split(self) -> (PostListParams, PageRequest) {
        let page = PageRequest::from_raw(
            self.page.as_deref(),
            self.limit.as_deref(),
            PageDefaults::STANDARD,
        );
        let params = PostListParams {
            status: self.status,
            category: self.category,
            tag: self.tag,
            search: self.search,
            featured: self.featured.map(|raw| raw.trim() == "true"),
            sort: self.sort,
        };
        (params, page)
    }
}

/// Query string accepted by the related-posts endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RelatedQuery {
    /// Number of posts, default 3, at most 10.
    pub limit: Option<String>,
}

/// Create payload. Required text fields default to empty so validation can
/// report every missing field at once.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreatePostRequest {
    #[schema(example = "Hello, world")]
    pub title: String,
    pub excerpt: String,
    pub content: String,
    /// Category id or slug.
    pub category: String,
    pub tags: Vec<String>,
    pub slug: Option<String>,
    pub cover_image: Option<String>,
    #[schema(example = "draft")]
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<CreatePostRequest> for PostInput {
    fn from(request: CreatePostRequest) -> Self {
        Self {
            title: request.title,
            excerpt: request.excerpt,
            content: request.content,
            category: request.category,
            tags: request.tags,
            slug: request.slug,
            cover_image: request.cover_image,
            status: request.status,
            featured: request.featured,
            published_at: request.published_at,
        }
    }
}

/// Partial update payload; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub slug: Option<String>,
    pub cover_image: Option<String>,
    pub status: Option<String>,
    pub featured: Option<bool>,
}

impl From<UpdatePostRequest> for PostPatch {
    fn from(request: UpdatePostRequest) -> Self {
        Self {
            title: request.title,
            excerpt: request.excerpt,
            content: request.content,
            category: request.category,
            tags: request.tags,
            slug: request.slug,
            cover_image: request.cover_image,
            status: request.status,
            featured: request.featured,
        }
    }
}

/// Result of toggling a like.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

/// View counter after recording a view.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ViewResponse {
    pub view_count: u64,
}

/// List posts.
#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(PostListQuery),
    responses(
        (status = 200, description = "One page of posts", body = PostPageSchema),
        (status = 400, description = "Invalid filter or sort", body = Error),
        (status = 401, description = "Non-public status without a session", body = Error),
        (status = 404, description = "Unknown category", body = Error)
    ),
    tags = ["posts"],
    operation_id = "listPosts"
)]
#[get("/posts")]
pub async fn list_posts(
    state: web::Data<HttpState>,
    session: MaybeSession,
    query: web::Query<PostListQuery>,
) -> ApiResult<web::Json<Paginated<PostResponse>>> {
    let (params, page) = query.into_inner().split();
    let posts = state.posts.list(params, session.user(), page).await?;
    Ok(web::Json(posts.map(PostResponse::from)))
}

/// Create a post authored by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["posts"],
    operation_id = "createPost"
)]
#[post("/posts")]
pub async fn create_post(
    state: web::Data<HttpState>,
    user: SessionUser,
    payload: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let details = state
        .posts
        .create(payload.into_inner().into(), &user.0)
        .await?;
    Ok(HttpResponse::Created().json(PostResponse::from(details)))
}

/// Fetch a post by id or slug.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id_or_slug}",
    params(("id_or_slug" = String, Path, description = "Post id or slug")),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "Not found or not visible", body = Error)
    ),
    tags = ["posts"],
    operation_id = "getPost"
)]
#[get("/posts/{id_or_slug}")]
pub async fn get_post(
    state: web::Data<HttpState>,
    session: MaybeSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<PostResponse>> {
    let details = state.posts.get(&path, session.user()).await?;
    Ok(web::Json(details.into()))
}

/// Update a post. Only its author may do so.
#[utoipa::path(
    put,
    path = "/api/v1/posts/{id_or_slug}",
    params(("id_or_slug" = String, Path, description = "Post id or slug")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "updatePost"
)]
#[put("/posts/{id_or_slug}")]
pub async fn update_post(
    state: web::Data<HttpState>,
    user: SessionUser,
    path: web::Path<String>,
    payload: web::Json<UpdatePostRequest>,
) -> ApiResult<web::Json<PostResponse>> {
    let details = state
        .posts
        .update(&path, payload.into_inner().into(), &user.0)
        .await?;
    Ok(web::Json(details.into()))
}

/// Delete a post with its comments and likes.
#[utoipa::path(
    delete,
    path = "/api/v1/posts/{id_or_slug}",
    params(("id_or_slug" = String, Path, description = "Post id or slug")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Not the author", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "deletePost"
)]
#[delete("/posts/{id_or_slug}")]
pub async fn delete_post(
    state: web::Data<HttpState>,
    user: SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.posts.delete(&path, &user.0).await?;
    Ok(web::Json(MessageResponse::new("Post deleted")))
}

/// Published posts sharing the subject's category and tags.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id_or_slug}/related",
    params(
        ("id_or_slug" = String, Path, description = "Post id or slug"),
        RelatedQuery
    ),
    responses(
        (status = 200, description = "Related posts", body = [PostResponse]),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "relatedPosts"
)]
#[get("/posts/{id_or_slug}/related")]
pub async fn related_posts(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<RelatedQuery>,
) -> ApiResult<web::Json<Vec<PostResponse>>> {
    let related = state.posts.related(&path, query.limit.as_deref()).await?;
    Ok(web::Json(related.into_iter().map(PostResponse::from).collect()))
}

/// Toggle the caller's like.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id_or_slug}/like",
    params(("id_or_slug" = String, Path, description = "Post id or slug")),
    responses(
        (status = 200, description = "Like state after the toggle", body = LikeResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "toggleLike"
)]
#[post("/posts/{id_or_slug}/like")]
pub async fn toggle_like(
    state: web::Data<HttpState>,
    user: SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<LikeResponse>> {
    let outcome = state.posts.toggle_like(&path, &user.0).await?;
    Ok(web::Json(LikeResponse {
        liked: outcome.liked,
        like_count: outcome.like_count,
    }))
}

/// Record a view.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id_or_slug}/view",
    params(("id_or_slug" = String, Path, description = "Post id or slug")),
    responses(
        (status = 200, description = "View counter", body = ViewResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["posts"],
    operation_id = "recordView",
    security([])
)]
#[post("/posts/{id_or_slug}/view")]
pub async fn record_view(
    state: web::Data<HttpState>,
    session: MaybeSession,
    path: web::Path<String>,
) -> ApiResult<web::Json<ViewResponse>> {
    let view_count = state.posts.record_view(&path, session.user()).await?;
    Ok(web::Json(ViewResponse { view_count }))
}
