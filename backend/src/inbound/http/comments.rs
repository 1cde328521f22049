//! Comment endpoints.
//!
//! ```text
//! GET    /api/v1/posts/{idOrSlug}/comments?parent=<commentId>&page=1
//! POST   /api/v1/posts/{idOrSlug}/comments {"content":"Nice","parentComment":null}
//! PATCH  /api/v1/comments/{id}             {"status":"spam"}
//! DELETE /api/v1/comments/{id}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use pagination::{PageDefaults, PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::comment::{CommentPatch, CommentThread, CommentView};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{AuthorResponse, MessageResponse};
use crate::inbound::http::schemas::CommentPageSchema;
use crate::inbound::http::session::{MaybeSession, SessionUser};
use crate::inbound::http::state::HttpState;

/// A comment with its author summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub content: String,
    /// Absent when the author account no longer exists.
    pub author: Option<AuthorResponse>,
    /// Post id.
    pub post: String,
    /// Id of the comment this one replies to.
    pub parent_comment: Option<String>,
    #[schema(example = "approved")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CommentView> for CommentResponse {
    fn from(view: CommentView) -> Self {
        let CommentView { comment, author } = view;
        Self {
            id: comment.id.to_string(),
            content: comment.content,
            author: author.map(AuthorResponse::from),
            post: comment.post.to_string(),
            parent_comment: comment.parent.map(|parent| parent.to_string()),
            status: comment.status.as_str().to_owned(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

/// A comment with its approved replies, oldest reply first.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentThreadResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentResponse>,
}

impl From<CommentThread> for CommentThreadResponse {
    fn from(thread: CommentThread) -> Self {
        Self {
            comment: thread.comment.into(),
            replies: thread.replies.into_iter().map(CommentResponse::from).collect(),
        }
    }
}

/// Query string accepted by the comment listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CommentListQuery {
    /// `approved` (default), `pending` or `spam`.
    pub status: Option<String>,
    /// List the replies of this comment instead of top-level comments.
    pub parent: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// New comment payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCommentRequest {
    #[schema(example = "Great write-up!")]
    pub content: String,
    /// Comment being replied to; must belong to the same post.
    pub parent_comment: Option<String>,
}

/// Comment edit payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
    #[schema(example = "spam")]
    pub status: Option<String>,
}

/// List comments of a post.
#[utoipa::path(
    get,
    path = "/api/v1/posts/{id_or_slug}/comments",
    params(
        ("id_or_slug" = String, Path, description = "Post id or slug"),
        CommentListQuery
    ),
    responses(
        (status = 200, description = "One page of comment threads", body = CommentPageSchema),
        (status = 400, description = "Invalid status or parent", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "listComments"
)]
#[get("/posts/{id_or_slug}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    session: MaybeSession,
    path: web::Path<String>,
    query: web::Query<CommentListQuery>,
) -> ApiResult<web::Json<Paginated<CommentThreadResponse>>> {
    let query = query.into_inner();
    let page = PageRequest::from_raw(
        query.page.as_deref(),
        query.limit.as_deref(),
        PageDefaults::STANDARD,
    );
    let threads = state
        .comments
        .list(
            &path,
            query.status.as_deref(),
            query.parent.as_deref(),
            page,
            session.user(),
        )
        .await?;
    Ok(web::Json(threads.map(CommentThreadResponse::from)))
}

/// Comment on a post.
#[utoipa::path(
    post,
    path = "/api/v1/posts/{id_or_slug}/comments",
    params(("id_or_slug" = String, Path, description = "Post id or slug")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentThreadResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Post not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "createComment"
)]
#[post("/posts/{id_or_slug}/comments")]
pub async fn create_comment(
    state: web::Data<HttpState>,
    user: SessionUser,
    path: web::Path<String>,
    payload: web::Json<CreateCommentRequest>,
) -> ApiResult<HttpResponse> {
    let thread = state
        .comments
        .create(
            &path,
            &payload.content,
            payload.parent_comment.as_deref(),
            &user.0,
        )
        .await?;
    Ok(HttpResponse::Created().json(CommentThreadResponse::from(thread)))
}

/// Edit a comment's content or moderation status.
#[utoipa::path(
    patch,
    path = "/api/v1/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Updated comment", body = CommentResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Neither comment nor post author", body = Error),
        (status = 404, description = "Comment not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "updateComment"
)]
#[patch("/comments/{id}")]
pub async fn update_comment(
    state: web::Data<HttpState>,
    user: SessionUser,
    path: web::Path<String>,
    payload: web::Json<UpdateCommentRequest>,
) -> ApiResult<web::Json<CommentResponse>> {
    let UpdateCommentRequest { content, status } = payload.into_inner();
    let view = state
        .comments
        .update(&path, CommentPatch { content, status }, &user.0)
        .await?;
    Ok(web::Json(view.into()))
}

/// Delete a comment and its replies.
#[utoipa::path(
    delete,
    path = "/api/v1/comments/{id}",
    params(("id" = String, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 400, description = "Malformed id", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Neither comment nor post author", body = Error),
        (status = 404, description = "Comment not found", body = Error)
    ),
    tags = ["comments"],
    operation_id = "deleteComment"
)]
#[delete("/comments/{id}")]
pub async fn delete_comment(
    state: web::Data<HttpState>,
    user: SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.comments.delete(&path, &user.0).await?;
    Ok(web::Json(MessageResponse::new("Comment deleted")))
}
