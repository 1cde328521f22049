//! PostgreSQL-backed `CommentRepository`.
//!
//! Replies reference their parent with `ON DELETE CASCADE`, so deleting a
//! comment removes the whole sub-thread.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::CommentId;
use crate::domain::comment::{Comment, CommentFilter, CommentStatus};
use crate::domain::ports::{CommentPersistenceError, CommentRepository};

use super::diesel_error_mapping::{basic_error_mapping, classify};
use super::diesel_helpers::{limit_to_db, offset_to_db};
use super::models::{CommentRow, CommentUpdate, NewCommentRow, count_from_db};
use super::pool::DbPool;
use super::schema::comments;

basic_error_mapping!(CommentPersistenceError);

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> CommentPersistenceError {
    map_failure(classify(error, operation))
}

fn into_comments(rows: Vec<CommentRow>) -> Result<Vec<Comment>, CommentPersistenceError> {
    rows.into_iter()
        .map(Comment::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(CommentPersistenceError::query)
}

fn filtered(filter: &CommentFilter) -> comments::BoxedQuery<'static, diesel::pg::Pg> {
    let query = comments::table
        .filter(comments::post_id.eq(*filter.post.as_uuid()))
        .filter(comments::status.eq(filter.status.as_str()))
        .into_boxed();
    match filter.parent {
        Some(parent) => query.filter(comments::parent_id.eq(*parent.as_uuid())),
        None => query.filter(comments::parent_id.is_null()),
    }
}

/// Diesel implementation of the comment port.
#[derive(Clone)]
pub struct DieselCommentRepository {
    pool: DbPool,
}

impl DieselCommentRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for DieselCommentRepository {
    async fn list(
        &self,
        filter: &CommentFilter,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Comment>, u64), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count comments"))?;
        let rows: Vec<CommentRow> = filtered(filter)
            .order_by((comments::created_at.desc(), comments::id.desc()))
            .offset(offset_to_db(offset))
            .limit(limit_to_db(limit))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list comments"))?;
        Ok((into_comments(rows)?, count_from_db(total)))
    }

    async fn approved_replies(
        &self,
        parents: &[CommentId],
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        if parents.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = parents.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CommentRow> = comments::table
            .filter(comments::parent_id.eq_any(uuids))
            .filter(comments::status.eq(CommentStatus::Approved.as_str()))
            .order_by((comments::created_at.asc(), comments::id.asc()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load replies"))?;
        into_comments(rows)
    }

    async fn find_by_id(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CommentRow> = comments::table
            .find(id.as_uuid())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find comment"))?;
        row.map(Comment::try_from)
            .transpose()
            .map_err(CommentPersistenceError::query)
    }

    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(comments::table)
            .values(&NewCommentRow::from(comment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "insert comment"))
    }

    async fn update(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = CommentUpdate {
            content: &comment.content,
            status: comment.status.as_str(),
            updated_at: comment.updated_at,
        };
        let updated = diesel::update(comments::table.find(comment.id.as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "update comment"))?;
        if updated == 0 {
            return Err(CommentPersistenceError::query(format!(
                "comment {} does not exist",
                comment.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &CommentId) -> Result<bool, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(comments::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete comment"))?;
        Ok(deleted > 0)
    }

    async fn count_with_status(
        &self,
        status: CommentStatus,
    ) -> Result<u64, CommentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = comments::table
            .filter(comments::status.eq(status.as_str()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count comments"))?;
        Ok(count_from_db(total))
    }
}
