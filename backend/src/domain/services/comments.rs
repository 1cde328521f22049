//! Comment use-cases: threaded listing and moderation by authors.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::Clock;
use pagination::{PageRequest, Paginated};
use tracing::debug;

use crate::domain::comment::{
    Comment, CommentFilter, CommentPatch, CommentStatus, CommentThread, CommentView,
    validate_content,
};
use crate::domain::validation::{FieldErrors, field_error};
use crate::domain::{AuthorSummary, CommentId, Error, User, UserId};

use super::BlogRepositories;
use super::lookup::{parse_comment_id, resolve_visible_post};

/// Comment use-cases.
#[derive(Clone)]
pub struct CommentService {
    repos: BlogRepositories,
    clock: Arc<dyn Clock>,
}

impl CommentService {
    /// Create the service.
    pub fn new(repos: BlogRepositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// List comments of a post, newest first. Without `parent` only
    /// top-level comments are listed; with it, that comment's replies.
    pub async fn list(
        &self,
        post_ref: &str,
        status: Option<&str>,
        parent: Option<&str>,
        page: PageRequest,
        viewer: Option<&User>,
    ) -> Result<Paginated<CommentThread>, Error> {
        let post = resolve_visible_post(&self.repos, post_ref, viewer.map(|user| &user.id)).await?;
        let status = match status.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => raw
                .parse::<CommentStatus>()
                .map_err(|err| field_error("status", err.to_string()))?,
            None => CommentStatus::Approved,
        };
        let parent = match parent.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => Some(parse_comment_id(raw, "parent")?),
            None => None,
        };
        let filter = CommentFilter {
            post: post.id,
            parent,
            status,
        };
        let (comments, total) = self
            .repos
            .comments
            .list(&filter, page.offset(), page.limit())
            .await?;
        let threads = self.threads(comments).await?;
        Ok(Paginated::new(threads, page, total))
    }

    /// Add a comment, optionally replying to another comment on the same
    /// post.
    pub async fn create(
        &self,
        post_ref: &str,
        content: &str,
        parent: Option<&str>,
        author: &User,
    ) -> Result<CommentThread, Error> {
        let post = resolve_visible_post(&self.repos, post_ref, Some(&author.id)).await?;
        let mut errors = FieldErrors::new();
        let content = errors.check("content", validate_content(content));
        let parent = match parent.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => errors.check(
                "parentComment",
                CommentId::new(raw).map_err(|err| err.to_string()),
            ),
            None => None,
        };
        errors.into_result()?;
        let content = content.ok_or_else(|| Error::internal("comment content unresolved"))?;

        if let Some(parent_id) = parent {
            let parent_comment = self.repos.comments.find_by_id(&parent_id).await?;
            if parent_comment.is_none_or(|comment| comment.post != post.id) {
                return Err(field_error(
                    "parentComment",
                    "parent comment does not exist on this post",
                ));
            }
        }

        let now = self.clock.utc();
        let comment = Comment {
            id: CommentId::random(),
            content,
            author: author.id,
            post: post.id,
            parent,
            status: CommentStatus::Approved,
            created_at: now,
            updated_at: now,
        };
        self.repos.comments.insert(&comment).await?;
        debug!(comment_id = %comment.id, post_id = %post.id, "comment created");
        Ok(CommentThread {
            comment: CommentView {
                comment,
                author: Some(AuthorSummary::from(author)),
            },
            replies: Vec::new(),
        })
    }

    /// Edit content or status. Allowed for the comment author and the post
    /// author.
    pub async fn update(
        &self,
        raw_id: &str,
        patch: CommentPatch,
        editor: &User,
    ) -> Result<CommentView, Error> {
        let mut comment = self.moderated_comment(raw_id, editor).await?;
        let mut errors = FieldErrors::new();
        let content = match patch.content.as_deref() {
            Some(raw) => errors.check("content", validate_content(raw)),
            None => None,
        };
        let status = match patch.status.as_deref() {
            Some(raw) => errors.check("status", raw.parse::<CommentStatus>()),
            None => None,
        };
        errors.into_result()?;

        if let Some(content) = content {
            comment.content = content;
        }
        if let Some(status) = status {
            comment.status = status;
        }
        comment.updated_at = self.clock.utc();
        self.repos.comments.update(&comment).await?;
        let author = self.author_summary(&comment.author).await?;
        Ok(CommentView { comment, author })
    }

    /// Delete a comment and its replies.
    pub async fn delete(&self, raw_id: &str, editor: &User) -> Result<(), Error> {
        let comment = self.moderated_comment(raw_id, editor).await?;
        if !self.repos.comments.delete(&comment.id).await? {
            return Err(comment_not_found());
        }
        debug!(comment_id = %comment.id, "comment deleted");
        Ok(())
    }

    async fn moderated_comment(&self, raw_id: &str, editor: &User) -> Result<Comment, Error> {
        let id = parse_comment_id(raw_id, "id")?;
        let comment = self
            .repos
            .comments
            .find_by_id(&id)
            .await?
            .ok_or_else(comment_not_found)?;
        if comment.author == editor.id {
            return Ok(comment);
        }
        let post_author = self
            .repos
            .posts
            .find_by_id(&comment.post)
            .await?
            .map(|post| post.author);
        if post_author == Some(editor.id) {
            Ok(comment)
        } else {
            Err(Error::forbidden(
                "only the comment author or the post author may modify this comment",
            ))
        }
    }

    async fn author_summary(&self, id: &UserId) -> Result<Option<AuthorSummary>, Error> {
        Ok(self
            .repos
            .users
            .find_by_id(id)
            .await?
            .as_ref()
            .map(AuthorSummary::from))
    }

    async fn threads(&self, comments: Vec<Comment>) -> Result<Vec<CommentThread>, Error> {
        let ids: Vec<CommentId> = comments.iter().map(|comment| comment.id).collect();
        let replies = if ids.is_empty() {
            Vec::new()
        } else {
            self.repos.comments.approved_replies(&ids).await?
        };

        let mut author_ids: Vec<UserId> = comments
            .iter()
            .chain(replies.iter())
            .map(|comment| comment.author)
            .collect();
        author_ids.sort();
        author_ids.dedup();
        let authors: HashMap<UserId, AuthorSummary> = self
            .repos
            .users
            .find_many(&author_ids)
            .await?
            .iter()
            .map(|user| (user.id, AuthorSummary::from(user)))
            .collect();
        let view = |comment: Comment| CommentView {
            author: authors.get(&comment.author).cloned(),
            comment,
        };

        let mut grouped: HashMap<CommentId, Vec<CommentView>> = HashMap::new();
        for reply in replies {
            if let Some(parent) = reply.parent {
                grouped.entry(parent).or_default().push(view(reply));
            }
        }
        Ok(comments
            .into_iter()
            .map(|comment| CommentThread {
                replies: grouped.remove(&comment.id).unwrap_or_default(),
                comment: view(comment),
            })
            .collect())
    }
}

fn comment_not_found() -> Error {
    Error::not_found("comment not found")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::post::PostStatus;
    use crate::domain::services::test_fixtures::Fixture;
    use pagination::PageDefaults;
    use rstest::rstest;

    fn service(fixture: &Fixture) -> CommentService {
        CommentService::new(fixture.repos.clone(), fixture.clock())
    }

    fn first_page() -> PageRequest {
        PageRequest::from_raw(None, None, PageDefaults::STANDARD)
    }

    struct Thread {
        fixture: Fixture,
        ada: User,
        bob: User,
        root: CommentThread,
    }

    async fn thread() -> Thread {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let bob = fixture.user("Bob").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "live", PostStatus::Published).await;
        let root = service(&fixture)
            .create("live", "First!", None, &bob)
            .await
            .expect("root comment");
        Thread {
            fixture,
            ada,
            bob,
            root,
        }
    }

    #[tokio::test]
    async fn replies_are_nested_oldest_first() {
        let Thread {
            fixture, ada, bob, root,
        } = thread().await;
        let comments = service(&fixture);
        let root_id = root.comment.comment.id.to_string();
        comments
            .create("live", "reply one", Some(&root_id), &ada)
            .await
            .expect("reply");
        fixture.clock.advance_seconds(5);
        comments
            .create("live", "reply two", Some(&root_id), &bob)
            .await
            .expect("reply");

        let page = comments
            .list("live", None, None, first_page(), None)
            .await
            .expect("listed");
        assert_eq!(page.pagination.total, 1);
        let replies: Vec<_> = page.data[0]
            .replies
            .iter()
            .map(|reply| reply.comment.content.as_str())
            .collect();
        assert_eq!(replies, vec!["reply one", "reply two"]);
        assert_eq!(
            page.data[0].comment.author.as_ref().map(|a| a.name.as_str()),
            Some("Bob")
        );

        let nested = comments
            .list("live", None, Some(&root_id), first_page(), None)
            .await
            .expect("replies");
        assert_eq!(nested.pagination.total, 2);
        assert_eq!(nested.data[0].comment.comment.content, "reply two");
    }

    #[rstest]
    #[case(Some("not-a-uuid"), None, ErrorCode::InvalidRequest)]
    #[case(None, Some("deleted"), ErrorCode::InvalidRequest)]
    #[tokio::test]
    async fn list_validates_query(
        #[case] parent: Option<&str>,
        #[case] status: Option<&str>,
        #[case] code: ErrorCode,
    ) {
        let Thread { fixture, .. } = thread().await;
        let err = service(&fixture)
            .list("live", status, parent, first_page(), None)
            .await
            .expect_err("invalid query");
        assert_eq!(err.code(), code);
    }

    #[tokio::test]
    async fn create_rejects_parent_from_other_post() {
        let Thread {
            fixture, ada, root, ..
        } = thread().await;
        let news = fixture.category("other").await;
        fixture.post(&ada, &news, "second", PostStatus::Published).await;
        let root_id = root.comment.comment.id.to_string();

        let err = service(&fixture)
            .create("second", "misplaced reply", Some(&root_id), &ada)
            .await
            .expect_err("foreign parent");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn create_validates_content() {
        let Thread { fixture, ada, .. } = thread().await;
        let err = service(&fixture)
            .create("live", " x ", None, &ada)
            .await
            .expect_err("short");
        assert!(err.details().expect("details")["fields"].get("content").is_some());
    }

    #[tokio::test]
    async fn post_author_can_moderate() {
        let Thread {
            fixture, ada, root, ..
        } = thread().await;
        let id = root.comment.comment.id.to_string();
        let updated = service(&fixture)
            .update(
                &id,
                CommentPatch {
                    status: Some("spam".to_owned()),
                    ..CommentPatch::default()
                },
                &ada,
            )
            .await
            .expect("moderated");
        assert_eq!(updated.comment.status, CommentStatus::Spam);
        assert_eq!(updated.comment.content, "First!");
    }

    #[tokio::test]
    async fn strangers_cannot_edit_or_delete() {
        let Thread { fixture, root, .. } = thread().await;
        let eve = fixture.user("Eve").await;
        let id = root.comment.comment.id.to_string();
        let comments = service(&fixture);

        let err = comments
            .update(&id, CommentPatch::default(), &eve)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        let err = comments.delete(&id, &eve).await.expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case("nonsense", ErrorCode::InvalidRequest)]
    #[case("3fa85f64-5717-4562-b3fc-2c963f66afa6", ErrorCode::NotFound)]
    #[tokio::test]
    async fn delete_checks_identifier(#[case] id: &str, #[case] code: ErrorCode) {
        let Thread { fixture, bob, .. } = thread().await;
        let err = service(&fixture).delete(id, &bob).await.expect_err("rejected");
        assert_eq!(err.code(), code);
    }

    #[tokio::test]
    async fn deleting_root_removes_replies() {
        let Thread {
            fixture, ada, bob, root,
        } = thread().await;
        let comments = service(&fixture);
        let root_id = root.comment.comment.id.to_string();
        comments
            .create("live", "a reply", Some(&root_id), &ada)
            .await
            .expect("reply");

        comments.delete(&root_id, &bob).await.expect("deleted");
        let page = comments
            .list("live", None, Some(&root_id), first_page(), None)
            .await
            .expect("listed");
        assert_eq!(page.pagination.total, 0);
    }
}
