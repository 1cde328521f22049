//! PostgreSQL-backed `PostRepository`.
//!
//! Likes live in `post_likes`; the `likes` column on `posts` is kept in step
//! inside the toggle transaction so listings can sort on it.

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Text};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::post::{
    LikeOutcome, Post, PostFilter, PostQuery, PostSortKey, PostStatus, SortDirection,
};
use crate::domain::ports::{PostPersistenceError, PostRepository};
use crate::domain::search::TagCount;
use crate::domain::{CategoryId, PostId, UserId};

use super::diesel_error_mapping::{basic_error_mapping, classify};
use super::diesel_helpers::{contains_pattern, limit_to_db, offset_to_db};
use super::models::{NewPostLikeRow, NewPostRow, PostRow, PostUpdate, count_from_db};
use super::pool::DbPool;
use super::schema::{post_likes, posts};

const SLUG_CONSTRAINT: &str = "posts_slug_key";

const SEARCH_SQL: &str = r#"
SELECT * FROM posts
WHERE status = 'published'
  AND (
    title ILIKE $1
    OR excerpt ILIKE $1
    OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $1)
  )
ORDER BY published_at DESC NULLS LAST, id ASC
LIMIT $2
"#;

const TAG_COUNTS_SQL: &str = r#"
SELECT tag AS name, COUNT(*) AS count
FROM posts, unnest(posts.tags) AS tag
WHERE posts.status = 'published' AND tag ILIKE $1
GROUP BY tag
ORDER BY count DESC, tag ASC
LIMIT $2
"#;

#[derive(QueryableByName)]
struct TagCountRow {
    #[diesel(sql_type = Text)]
    name: String,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

basic_error_mapping!(PostPersistenceError);

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> PostPersistenceError {
    map_failure(classify(error, operation))
}

fn map_write_error(error: diesel::result::Error, operation: &str, slug: &str) -> PostPersistenceError {
    let failure = classify(error, operation);
    if failure.is_unique(SLUG_CONSTRAINT) {
        PostPersistenceError::duplicate_slug(slug)
    } else {
        map_failure(failure)
    }
}

fn into_posts(rows: Vec<PostRow>) -> Result<Vec<Post>, PostPersistenceError> {
    rows.into_iter()
        .map(Post::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(PostPersistenceError::query)
}

fn filtered(filter: &PostFilter) -> posts::BoxedQuery<'static, Pg> {
    let mut query = posts::table.into_boxed();
    if let Some(status) = filter.status {
        query = query.filter(posts::status.eq(status.as_str()));
    }
    if let Some(author) = filter.author {
        query = query.filter(posts::author_id.eq(*author.as_uuid()));
    }
    if let Some(category) = filter.category {
        query = query.filter(posts::category_id.eq(*category.as_uuid()));
    }
    if let Some(tag) = &filter.tag {
        query = query.filter(posts::tags.contains(vec![tag.clone()]));
    }
    if let Some(term) = &filter.search {
        let pattern = contains_pattern(term);
        query = query.filter(
            posts::title
                .ilike(pattern.clone())
                .or(posts::excerpt.ilike(pattern.clone()))
                .or(posts::content.ilike(pattern)),
        );
    }
    if filter.featured_only {
        query = query.filter(posts::featured.eq(true));
    }
    query
}

fn order_by_key(
    query: posts::BoxedQuery<'static, Pg>,
    key: PostSortKey,
    direction: SortDirection,
) -> posts::BoxedQuery<'static, Pg> {
    use SortDirection::{Asc, Desc};
    match (key, direction) {
        (PostSortKey::PublishedAt, Asc) => {
            query.then_order_by(posts::published_at.asc().nulls_first())
        }
        (PostSortKey::PublishedAt, Desc) => {
            query.then_order_by(posts::published_at.desc().nulls_last())
        }
        (PostSortKey::CreatedAt, Asc) => query.then_order_by(posts::created_at.asc()),
        (PostSortKey::CreatedAt, Desc) => query.then_order_by(posts::created_at.desc()),
        (PostSortKey::UpdatedAt, Asc) => query.then_order_by(posts::updated_at.asc()),
        (PostSortKey::UpdatedAt, Desc) => query.then_order_by(posts::updated_at.desc()),
        (PostSortKey::Title, Asc) => query.then_order_by(posts::title.asc()),
        (PostSortKey::Title, Desc) => query.then_order_by(posts::title.desc()),
        (PostSortKey::Views, Asc) => query.then_order_by(posts::views.asc()),
        (PostSortKey::Views, Desc) => query.then_order_by(posts::views.desc()),
        (PostSortKey::Likes, Asc) => query.then_order_by(posts::likes.asc()),
        (PostSortKey::Likes, Desc) => query.then_order_by(posts::likes.desc()),
    }
}

/// Diesel implementation of the post port.
#[derive(Clone)]
pub struct DieselPostRepository {
    pool: DbPool,
}

impl DieselPostRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for DieselPostRepository {
    async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(&query.filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count posts"))?;

        let ordered = query
            .sort
            .keys()
            .iter()
            .fold(filtered(&query.filter), |acc, (key, direction)| {
                order_by_key(acc, *key, *direction)
            });
        let rows: Vec<PostRow> = ordered
            .then_order_by(posts::id.asc())
            .offset(offset_to_db(query.offset))
            .limit(limit_to_db(query.limit))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list posts"))?;
        Ok((into_posts(rows)?, count_from_db(total)))
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .find(id.as_uuid())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find post"))?;
        row.map(Post::try_from)
            .transpose()
            .map_err(PostPersistenceError::query)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PostRow> = posts::table
            .filter(posts::slug.eq(slug))
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find post by slug"))?;
        row.map(Post::try_from)
            .transpose()
            .map_err(PostPersistenceError::query)
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude: Option<PostId>,
    ) -> Result<bool, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = posts::table.filter(posts::slug.eq(slug)).into_boxed();
        if let Some(exclude) = exclude {
            query = query.filter(posts::id.ne(*exclude.as_uuid()));
        }
        let owners: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "check post slug"))?;
        Ok(owners > 0)
    }

    async fn insert(&self, post: &Post) -> Result<(), PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(posts::table)
            .values(&NewPostRow::from(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, "insert post", &post.slug))
    }

    async fn update(&self, post: &Post) -> Result<(), PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(posts::table.find(post.id.as_uuid()))
            .set(&PostUpdate::from(post))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, "update post", &post.slug))?;
        if updated == 0 {
            return Err(PostPersistenceError::query(format!(
                "post {} does not exist",
                post.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(posts::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete post"))?;
        Ok(deleted > 0)
    }

    async fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> Result<Option<LikeOutcome>, PostPersistenceError> {
        let post_id = *id.as_uuid();
        let user_id = *user.as_uuid();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let exists: Option<Uuid> = posts::table
                    .find(post_id)
                    .select(posts::id)
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                if exists.is_none() {
                    return Ok(None);
                }

                let removed = diesel::delete(
                    post_likes::table
                        .filter(post_likes::post_id.eq(post_id))
                        .filter(post_likes::user_id.eq(user_id)),
                )
                .execute(conn)
                .await?;
                if removed == 0 {
                    diesel::insert_into(post_likes::table)
                        .values(&NewPostLikeRow { post_id, user_id })
                        .execute(conn)
                        .await?;
                }

                let like_count: i64 = post_likes::table
                    .filter(post_likes::post_id.eq(post_id))
                    .count()
                    .get_result(conn)
                    .await?;
                diesel::update(posts::table.find(post_id))
                    .set(posts::likes.eq(like_count))
                    .execute(conn)
                    .await?;

                Ok(Some(LikeOutcome {
                    liked: removed == 0,
                    like_count: count_from_db(like_count),
                }))
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "toggle like"))
    }

    async fn increment_views(&self, id: &PostId) -> Result<Option<u64>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let views: Option<i64> = diesel::update(posts::table.find(id.as_uuid()))
            .set(posts::views.eq(posts::views + 1))
            .returning(posts::views)
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "increment views"))?;
        Ok(views.map(count_from_db))
    }

    async fn related(&self, post: &Post, limit: u32) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = posts::table
            .filter(posts::status.eq(PostStatus::Published.as_str()))
            .filter(posts::id.ne(*post.id.as_uuid()))
            .filter(posts::category_id.eq(*post.category.as_uuid()))
            .into_boxed();
        if !post.tags.is_empty() {
            query = query.filter(posts::tags.overlaps_with(post.tags.clone()));
        }
        let rows: Vec<PostRow> = query
            .order_by((posts::published_at.desc().nulls_last(), posts::id.asc()))
            .limit(limit_to_db(limit))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "related posts"))?;
        into_posts(rows)
    }

    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Post>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PostRow> = sql_query(SEARCH_SQL)
            .bind::<Text, _>(contains_pattern(term))
            .bind::<BigInt, _>(limit_to_db(limit))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "search posts"))?;
        into_posts(rows)
    }

    async fn tag_counts(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<TagCount>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<TagCountRow> = sql_query(TAG_COUNTS_SQL)
            .bind::<Text, _>(contains_pattern(term))
            .bind::<BigInt, _>(limit_to_db(limit))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "search tags"))?;
        Ok(rows
            .into_iter()
            .map(|row| TagCount {
                name: row.name,
                count: count_from_db(row.count),
            })
            .collect())
    }

    async fn count(&self, status: Option<PostStatus>) -> Result<u64, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = posts::table.into_boxed();
        if let Some(status) = status {
            query = query.filter(posts::status.eq(status.as_str()));
        }
        let total: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count posts"))?;
        Ok(count_from_db(total))
    }

    async fn count_in_category(
        &self,
        category: &CategoryId,
    ) -> Result<u64, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = posts::table
            .filter(posts::category_id.eq(category.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count category posts"))?;
        Ok(count_from_db(total))
    }

    async fn published_per_category(
        &self,
    ) -> Result<Vec<(CategoryId, u64)>, PostPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(Uuid, i64)> = posts::table
            .filter(posts::status.eq(PostStatus::Published.as_str()))
            .group_by(posts::category_id)
            .select((posts::category_id, count_star()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count posts per category"))?;
        let mut counts: Vec<(CategoryId, u64)> = rows
            .into_iter()
            .map(|(id, count)| (CategoryId::from_uuid(id), count_from_db(count)))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(counts)
    }
}
