//! Site search endpoint.
//!
//! ```text
//! GET /api/v1/search?q=rust&type=posts
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::search::{SearchQuery, SearchResults, TagCount};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{CategoryResponse, PostResponse};
use crate::inbound::http::state::HttpState;

/// Query string accepted by the search endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Search term; at least two characters once trimmed.
    #[param(example = "rust")]
    pub q: Option<String>,
    /// `all` (default), `posts`, `tags` or `categories`.
    #[serde(rename = "type")]
    pub scope: Option<String>,
}

/// Tag usage count across published posts.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagCountResponse {
    pub name: String,
    pub count: u64,
}

impl From<TagCount> for TagCountResponse {
    fn from(tag: TagCount) -> Self {
        Self {
            name: tag.name,
            count: tag.count,
        }
    }
}

/// Search hits. Sections outside the requested scope are omitted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SearchResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<PostResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagCountResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryResponse>>,
}

impl From<SearchResults> for SearchResponse {
    fn from(results: SearchResults) -> Self {
        Self {
            posts: results
                .posts
                .map(|posts| posts.into_iter().map(PostResponse::from).collect()),
            tags: results
                .tags
                .map(|tags| tags.into_iter().map(TagCountResponse::from).collect()),
            categories: results.categories.map(|categories| {
                categories
                    .into_iter()
                    .map(CategoryResponse::from)
                    .collect()
            }),
        }
    }
}

/// Search published posts, their tags and visible categories.
#[utoipa::path(
    get,
    path = "/api/v1/search",
    params(SearchParams),
    responses(
        (status = 200, description = "Search hits", body = SearchResponse),
        (status = 400, description = "Term too short or unknown type", body = Error)
    ),
    tags = ["search"],
    operation_id = "search",
    security([])
)]
#[get("/search")]
pub async fn search(
    state: web::Data<HttpState>,
    params: web::Query<SearchParams>,
) -> ApiResult<web::Json<SearchResponse>> {
    let query = SearchQuery::parse(params.q.as_deref(), params.scope.as_deref())?;
    let results = state.search.search(&query).await?;
    Ok(web::Json(results.into()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::category::CategoryInput;
    use crate::domain::post::PostInput;
    use crate::inbound::http::test_utils::{TestContext, register_user, test_app};

    async fn seed(ctx: &TestContext) {
        let session = register_user(ctx, "Ada", "ada@example.com").await;
        let user = ctx
            .state
            .auth
            .authenticate(&session.token)
            .await
            .expect("session resolves");
        ctx.state
            .categories
            .create(CategoryInput {
                name: "Rustaceans".to_owned(),
                description: Some("All about (rust)".to_owned()),
                ..Default::default()
            })
            .await
            .expect("category created");
        ctx.state
            .posts
            .create(
                PostInput {
                    title: "Learning Rust the hard way".to_owned(),
                    excerpt: "An excerpt long enough".to_owned(),
                    content: "c".repeat(60),
                    category: "rustaceans".to_owned(),
                    tags: vec!["rust".to_owned(), "rustc".to_owned()],
                    status: Some("published".to_owned()),
                    ..PostInput::default()
                },
                &user,
            )
            .await
            .expect("post created");
    }

    #[actix_web::test]
    async fn all_scope_returns_every_section() {
        let ctx = TestContext::new();
        seed(&ctx).await;
        let app = actix_test::init_service(test_app(&ctx)).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/search?q=rust")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["posts"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["tags"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["categories"][0]["slug"], "rustaceans");
    }

    #[actix_web::test]
    async fn scoped_search_omits_other_sections() {
        let ctx = TestContext::new();
        seed(&ctx).await;
        let app = actix_test::init_service(test_app(&ctx)).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/search?q=rust&type=tags")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert!(body.get("posts").is_none());
        assert!(body.get("categories").is_none());
        assert_eq!(body["tags"][0]["count"], 1);
    }

    #[actix_web::test]
    async fn regex_metacharacters_match_literally() {
        let ctx = TestContext::new();
        seed(&ctx).await;
        let app = actix_test::init_service(test_app(&ctx)).await;
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/search?q=(rust)&type=categories")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(body["categories"].as_array().map(Vec::len), Some(1));
    }

    #[rstest]
    #[case("/api/v1/search")]
    #[case("/api/v1/search?q=%20r%20")]
    #[case("/api/v1/search?q=rust&type=users")]
    #[actix_web::test]
    async fn bad_queries_are_rejected(#[case] uri: &str) {
        let ctx = TestContext::new();
        let app = actix_test::init_service(test_app(&ctx)).await;
        let request = actix_test::TestRequest::get().uri(uri).to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
