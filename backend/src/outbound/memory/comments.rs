use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::CommentId;
use crate::domain::comment::{Comment, CommentFilter, CommentStatus};
use crate::domain::ports::{CommentPersistenceError, CommentRepository};

use super::{MemoryBlogStore, count, take_page};

#[async_trait]
impl CommentRepository for MemoryBlogStore {
    async fn list(
        &self,
        filter: &CommentFilter,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<Comment>, u64), CommentPersistenceError> {
        let state = self.lock().map_err(CommentPersistenceError::query)?;
        let mut matching: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| filter.matches(comment))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = count(matching.len());
        Ok((take_page(matching, offset, limit), total))
    }

    async fn approved_replies(
        &self,
        parents: &[CommentId],
    ) -> Result<Vec<Comment>, CommentPersistenceError> {
        let state = self.lock().map_err(CommentPersistenceError::query)?;
        let mut replies: Vec<Comment> = state
            .comments
            .values()
            .filter(|comment| comment.status == CommentStatus::Approved)
            .filter(|comment| comment.parent.is_some_and(|parent| parents.contains(&parent)))
            .cloned()
            .collect();
        replies.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(replies)
    }

    async fn find_by_id(
        &self,
        id: &CommentId,
    ) -> Result<Option<Comment>, CommentPersistenceError> {
        let state = self.lock().map_err(CommentPersistenceError::query)?;
        Ok(state.comments.get(id).cloned())
    }

    async fn insert(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut state = self.lock().map_err(CommentPersistenceError::query)?;
        if !state.posts.contains_key(&comment.post) {
            return Err(CommentPersistenceError::query(format!(
                "post {} does not exist",
                comment.post
            )));
        }
        state.comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<(), CommentPersistenceError> {
        let mut state = self.lock().map_err(CommentPersistenceError::query)?;
        let Some(stored) = state.comments.get_mut(&comment.id) else {
            return Err(CommentPersistenceError::query(format!(
                "comment {} does not exist",
                comment.id
            )));
        };
        stored.content.clone_from(&comment.content);
        stored.status = comment.status;
        stored.updated_at = comment.updated_at;
        Ok(())
    }

    async fn delete(&self, id: &CommentId) -> Result<bool, CommentPersistenceError> {
        let mut state = self.lock().map_err(CommentPersistenceError::query)?;
        if !state.comments.contains_key(id) {
            return Ok(false);
        }
        let mut doomed = HashSet::from([*id]);
        loop {
            let before = doomed.len();
            let children: Vec<CommentId> = state
                .comments
                .values()
                .filter(|comment| comment.parent.is_some_and(|parent| doomed.contains(&parent)))
                .map(|comment| comment.id)
                .collect();
            doomed.extend(children);
            if doomed.len() == before {
                break;
            }
        }
        state.comments.retain(|id, _| !doomed.contains(id));
        Ok(true)
    }

    async fn count_with_status(
        &self,
        status: CommentStatus,
    ) -> Result<u64, CommentPersistenceError> {
        let state = self.lock().map_err(CommentPersistenceError::query)?;
        Ok(count(
            state
                .comments
                .values()
                .filter(|comment| comment.status == status)
                .count(),
        ))
    }
}
