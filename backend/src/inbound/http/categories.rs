//! Category endpoints.
//!
//! ```text
//! GET    /api/v1/categories?includeHidden=true&parent=engineering
//! POST   /api/v1/categories {"name":"Rust","parent":"engineering"}
//! GET    /api/v1/categories/{idOrSlug}
//! PUT    /api/v1/categories/{idOrSlug} {"name":"Rust","parent":null}
//! DELETE /api/v1/categories/{idOrSlug}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Error;
use crate::domain::category::{CategoryInput, ParentChange};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::{CategoryResponse, MessageResponse};
use crate::inbound::http::session::SessionUser;
use crate::inbound::http::state::HttpState;

/// Query string accepted by the category listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct CategoryListQuery {
    /// `true` includes hidden categories.
    pub include_hidden: Option<String>,
    /// Parent id or slug; lists only its children.
    pub parent: Option<String>,
}

/// Distinguishes an absent field from an explicit `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Create and update payload.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryRequest {
    #[schema(example = "Engineering")]
    pub name: String,
    /// Lowercase letters, digits and hyphens.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    /// Parent id or slug; `null` removes the parent on update.
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, nullable)]
    pub parent: Option<Option<String>>,
    pub is_visible: Option<bool>,
}

impl From<CategoryRequest> for CategoryInput {
    fn from(request: CategoryRequest) -> Self {
        let parent = match request.parent {
            None => ParentChange::Keep,
            Some(None) => ParentChange::Clear,
            Some(Some(reference)) => ParentChange::Set(reference),
        };
        Self {
            name: request.name,
            slug: request.slug,
            description: request.description,
            icon: request.icon,
            parent,
            is_visible: request.is_visible,
        }
    }
}

/// List categories sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = [CategoryResponse]),
        (status = 400, description = "Unknown parent", body = Error)
    ),
    tags = ["categories"],
    operation_id = "listCategories",
    security([])
)]
#[get("/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    query: web::Query<CategoryListQuery>,
) -> ApiResult<web::Json<Vec<CategoryResponse>>> {
    let include_hidden = query.include_hidden.as_deref().map(str::trim) == Some("true");
    let categories = state
        .categories
        .list(include_hidden, query.parent.as_deref())
        .await?;
    Ok(web::Json(
        categories.into_iter().map(CategoryResponse::from).collect(),
    ))
}

/// Create a category.
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation failed", body = Error),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["categories"],
    operation_id = "createCategory"
)]
#[post("/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    _user: SessionUser,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<HttpResponse> {
    let category = state.categories.create(payload.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// Fetch a category by id or slug.
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id_or_slug}",
    params(("id_or_slug" = String, Path, description = "Category id or slug")),
    responses(
        (status = 200, description = "The category", body = CategoryResponse),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "getCategory",
    security([])
)]
#[get("/categories/{id_or_slug}")]
pub async fn get_category(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let category = state.categories.get(&path).await?;
    Ok(web::Json(category.into()))
}

/// Replace a category's fields.
#[utoipa::path(
    put,
    path = "/api/v1/categories/{id_or_slug}",
    params(("id_or_slug" = String, Path, description = "Category id or slug")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Updated category", body = CategoryResponse),
        (status = 400, description = "Validation failed or parent cycle", body = Error),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["categories"],
    operation_id = "updateCategory"
)]
#[put("/categories/{id_or_slug}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    _user: SessionUser,
    path: web::Path<String>,
    payload: web::Json<CategoryRequest>,
) -> ApiResult<web::Json<CategoryResponse>> {
    let category = state
        .categories
        .update(&path, payload.into_inner().into())
        .await?;
    Ok(web::Json(category.into()))
}

/// Delete a category no post references.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id_or_slug}",
    params(("id_or_slug" = String, Path, description = "Category id or slug")),
    responses(
        (status = 200, description = "Category deleted", body = MessageResponse),
        (status = 401, description = "Not signed in", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 409, description = "Posts still use the category", body = Error)
    ),
    tags = ["categories"],
    operation_id = "deleteCategory"
)]
#[delete("/categories/{id_or_slug}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    _user: SessionUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    state.categories.delete(&path).await?;
    Ok(web::Json(MessageResponse::new("Category deleted")))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    use crate::domain::post::PostInput;
    use crate::inbound::http::test_utils::{TestContext, bearer, register_user, test_app};

    #[rstest]
    #[case(json!({"name": "Rust"}), ParentChange::Keep)]
    #[case(json!({"name": "Rust", "parent": null}), ParentChange::Clear)]
    #[case(json!({"name": "Rust", "parent": "engineering"}), ParentChange::Set("engineering".to_owned()))]
    fn parent_field_is_tri_state(#[case] body: Value, #[case] expected: ParentChange) {
        let request: CategoryRequest = serde_json::from_value(body).expect("valid payload");
        let input = CategoryInput::from(request);
        assert_eq!(input.parent, expected);
    }

    #[actix_web::test]
    async fn crud_round_trip() {
        let ctx = TestContext::new();
        let session = register_user(&ctx, "Ada", "ada@example.com").await;
        let app = actix_test::init_service(test_app(&ctx)).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(&session))
            .set_json(json!({"name": "Engineering", "description": "Build things"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let parent: Value = actix_test::read_body_json(response).await;
        assert_eq!(parent["slug"], "engineering");
        assert_eq!(parent["isVisible"], true);

        let request = actix_test::TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(&session))
            .set_json(json!({"name": "Rust Language", "parent": "engineering"}))
            .to_request();
        let child: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(child["parent"], parent["id"]);

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/categories?parent=engineering")
            .to_request();
        let children: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(children.as_array().map(Vec::len), Some(1));

        let request = actix_test::TestRequest::put()
            .uri("/api/v1/categories/rust-language")
            .insert_header(bearer(&session))
            .set_json(json!({"name": "Rust Language", "parent": null, "isVisible": false}))
            .to_request();
        let updated: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert!(updated["parent"].is_null());
        assert_eq!(updated["isVisible"], false);

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/categories")
            .to_request();
        let visible: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(visible.as_array().map(Vec::len), Some(1));
        let request = actix_test::TestRequest::get()
            .uri("/api/v1/categories?includeHidden=true")
            .to_request();
        let all: Value = actix_test::call_and_read_body_json(&app, request).await;
        assert_eq!(all.as_array().map(Vec::len), Some(2));

        let request = actix_test::TestRequest::delete()
            .uri("/api/v1/categories/rust-language")
            .insert_header(bearer(&session))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let request = actix_test::TestRequest::get()
            .uri("/api/v1/categories/rust-language")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    #[case(json!({"name": "Rust", "slug": "Not Valid"}))]
    #[case(json!({"name": "Rust", "parent": "missing"}))]
    #[case(json!({"name": "R"}))]
    #[actix_web::test]
    async fn invalid_payloads_are_rejected(#[case] body: Value) {
        let ctx = TestContext::new();
        let session = register_user(&ctx, "Ada", "ada@example.com").await;
        let app = actix_test::init_service(test_app(&ctx)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/categories")
            .insert_header(bearer(&session))
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn writes_require_a_session() {
        let ctx = TestContext::new();
        let app = actix_test::init_service(test_app(&ctx)).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/v1/categories")
            .set_json(json!({"name": "Engineering"}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn category_in_use_cannot_be_deleted() {
        let ctx = TestContext::new();
        let session = register_user(&ctx, "Ada", "ada@example.com").await;
        ctx.state
            .categories
            .create(CategoryInput {
                name: "Engineering".to_owned(),
                ..Default::default()
            })
            .await
            .expect("category created");
        let user = ctx
            .state
            .auth
            .authenticate(&session.token)
            .await
            .expect("session resolves");
        ctx.state
            .posts
            .create(
                PostInput {
                    title: "Uses the category".to_owned(),
                    excerpt: "An excerpt long enough".to_owned(),
                    content: "c".repeat(60),
                    category: "engineering".to_owned(),
                    ..PostInput::default()
                },
                &user,
            )
            .await
            .expect("post created");
        let app = actix_test::init_service(test_app(&ctx)).await;

        let request = actix_test::TestRequest::delete()
            .uri("/api/v1/categories/engineering")
            .insert_header(bearer(&session))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
