//! OpenAPI schema definitions for types that live outside the HTTP adapter.
//!
//! The pagination crate stays free of utoipa, so its envelope is described
//! here. The wrappers mirror the serialised shape of the real types.

use utoipa::ToSchema;

use crate::inbound::http::comments::CommentThreadResponse;
use crate::inbound::http::dto::PostResponse;

/// OpenAPI schema for [`pagination::Pagination`].
#[derive(ToSchema)]
#[schema(as = pagination::Pagination, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaginationSchema {
    /// Current one-based page.
    #[schema(example = 1)]
    page: u32,
    /// Page size used for the query.
    #[schema(example = 10)]
    limit: u32,
    /// Total number of matching items.
    #[schema(example = 42)]
    total: u64,
    /// Number of pages; never less than one.
    #[schema(example = 5)]
    total_pages: u64,
    has_next: bool,
    has_prev: bool,
}

/// One page of posts.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PostPageSchema {
    data: Vec<PostResponse>,
    pagination: PaginationSchema,
}

/// One page of top-level comments with their replies.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CommentPageSchema {
    data: Vec<CommentThreadResponse>,
    pagination: PaginationSchema,
}
