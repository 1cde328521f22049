//! Identifier resolution and response hydration shared by the services.

use std::collections::HashMap;

use crate::domain::category::{Category, CategorySummary};
use crate::domain::post::{Post, PostDetails};
use crate::domain::user::AuthorSummary;
use crate::domain::validation::field_error;
use crate::domain::{CategoryId, CommentId, Error, PostId, ResourceRef, UserId};

use super::BlogRepositories;

/// Resolve a post route parameter, failing with 404 when nothing matches.
pub(crate) async fn resolve_post(repos: &BlogRepositories, raw: &str) -> Result<Post, Error> {
    let found = match ResourceRef::parse(raw) {
        Ok(ResourceRef::Id(id)) => repos.posts.find_by_id(&PostId::from_uuid(id)).await?,
        Ok(ResourceRef::Slug(slug)) => repos.posts.find_by_slug(&slug).await?,
        Err(_) => None,
    };
    found.ok_or_else(post_not_found)
}

/// Resolve a post route parameter and hide posts the viewer may not see.
pub(crate) async fn resolve_visible_post(
    repos: &BlogRepositories,
    raw: &str,
    viewer: Option<&UserId>,
) -> Result<Post, Error> {
    let post = resolve_post(repos, raw).await?;
    if post.is_visible_to(viewer) {
        Ok(post)
    } else {
        Err(post_not_found())
    }
}

pub(crate) fn post_not_found() -> Error {
    Error::not_found("post not found")
}

/// Resolve a category id or slug. `Ok(None)` when nothing matches.
pub(crate) async fn find_category(
    repos: &BlogRepositories,
    raw: &str,
) -> Result<Option<Category>, Error> {
    let found = match ResourceRef::parse(raw) {
        Ok(ResourceRef::Id(id)) => {
            repos
                .categories
                .find_by_id(&CategoryId::from_uuid(id))
                .await?
        }
        Ok(ResourceRef::Slug(slug)) => repos.categories.find_by_slug(&slug).await?,
        Err(_) => None,
    };
    Ok(found)
}

/// Resolve a category referenced from a payload field; unknown references
/// are a validation failure on `field`.
pub(crate) async fn referenced_category(
    repos: &BlogRepositories,
    raw: &str,
    field: &'static str,
) -> Result<Category, Error> {
    find_category(repos, raw)
        .await?
        .ok_or_else(|| field_error(field, format!("{field} does not exist")))
}

/// Parse a comment id from a route or query parameter; malformed ids are 400.
pub(crate) fn parse_comment_id(raw: &str, field: &'static str) -> Result<CommentId, Error> {
    CommentId::new(raw.trim()).map_err(|err| field_error(field, err.to_string()))
}

/// Attach author and category summaries to `posts`, loading each referenced
/// user and category once.
pub(crate) async fn hydrate_posts(
    repos: &BlogRepositories,
    posts: Vec<Post>,
) -> Result<Vec<PostDetails>, Error> {
    let mut author_ids: Vec<UserId> = posts.iter().map(|post| post.author).collect();
    author_ids.sort();
    author_ids.dedup();
    let mut category_ids: Vec<CategoryId> = posts.iter().map(|post| post.category).collect();
    category_ids.sort();
    category_ids.dedup();

    let authors: HashMap<UserId, AuthorSummary> = repos
        .users
        .find_many(&author_ids)
        .await?
        .iter()
        .map(|user| (user.id, AuthorSummary::from(user)))
        .collect();
    let categories: HashMap<CategoryId, CategorySummary> = repos
        .categories
        .find_many(&category_ids)
        .await?
        .iter()
        .map(|category| (category.id, CategorySummary::from(category)))
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| PostDetails {
            author: authors.get(&post.author).cloned(),
            category: categories.get(&post.category).cloned(),
            post,
        })
        .collect())
}

/// Hydrate a single post.
pub(crate) async fn hydrate_post(repos: &BlogRepositories, post: Post) -> Result<PostDetails, Error> {
    hydrate_posts(repos, vec![post])
        .await?
        .pop()
        .ok_or_else(|| Error::internal("post hydration returned no rows"))
}
