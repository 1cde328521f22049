use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::post::{LikeOutcome, Post, PostQuery, PostSort, PostStatus};
use crate::domain::ports::{PostPersistenceError, PostRepository};
use crate::domain::search::TagCount;
use crate::domain::validation::contains_ignore_case;
use crate::domain::{CategoryId, PostId, UserId};

use super::{MemoryBlogStore, State, count, take_page};

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    let sort = PostSort::default();
    posts.sort_by(|a, b| sort.compare(a, b));
    posts
}

fn published(state: &State) -> impl Iterator<Item = &Post> {
    state
        .posts
        .values()
        .filter(|post| post.status == PostStatus::Published)
}

fn slug_owner(state: &State, slug: &str, exclude: Option<PostId>) -> bool {
    state
        .posts
        .values()
        .any(|post| post.slug == slug && Some(post.id) != exclude)
}

#[async_trait]
impl PostRepository for MemoryBlogStore {
    async fn list(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        let mut matching: Vec<Post> = state
            .posts
            .values()
            .filter(|post| query.filter.matches(post))
            .cloned()
            .collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));
        let total = count(matching.len());
        Ok((take_page(matching, query.offset, query.limit), total))
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        Ok(state.posts.get(id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        Ok(state.posts.values().find(|post| post.slug == slug).cloned())
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude: Option<PostId>,
    ) -> Result<bool, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        Ok(slug_owner(&state, slug, exclude))
    }

    async fn insert(&self, post: &Post) -> Result<(), PostPersistenceError> {
        let mut state = self.lock().map_err(PostPersistenceError::query)?;
        if slug_owner(&state, &post.slug, None) {
            return Err(PostPersistenceError::duplicate_slug(post.slug.clone()));
        }
        state.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn update(&self, post: &Post) -> Result<(), PostPersistenceError> {
        let mut state = self.lock().map_err(PostPersistenceError::query)?;
        if slug_owner(&state, &post.slug, Some(post.id)) {
            return Err(PostPersistenceError::duplicate_slug(post.slug.clone()));
        }
        let Some(stored) = state.posts.get_mut(&post.id) else {
            return Err(PostPersistenceError::query(format!(
                "post {} does not exist",
                post.id
            )));
        };
        let metrics = stored.metrics;
        *stored = post.clone();
        stored.metrics = metrics;
        Ok(())
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostPersistenceError> {
        let mut state = self.lock().map_err(PostPersistenceError::query)?;
        if state.posts.remove(id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, comment| comment.post != *id);
        state.likes.retain(|(post, _)| post != id);
        Ok(true)
    }

    async fn toggle_like(
        &self,
        id: &PostId,
        user: &UserId,
    ) -> Result<Option<LikeOutcome>, PostPersistenceError> {
        let mut state = self.lock().map_err(PostPersistenceError::query)?;
        if !state.posts.contains_key(id) {
            return Ok(None);
        }
        let key = (*id, *user);
        let liked = if state.likes.remove(&key) {
            false
        } else {
            state.likes.insert(key);
            true
        };
        let like_count = count(state.likes.iter().filter(|(post, _)| post == id).count());
        if let Some(post) = state.posts.get_mut(id) {
            post.metrics.likes = like_count;
        }
        Ok(Some(LikeOutcome { liked, like_count }))
    }

    async fn increment_views(&self, id: &PostId) -> Result<Option<u64>, PostPersistenceError> {
        let mut state = self.lock().map_err(PostPersistenceError::query)?;
        Ok(state.posts.get_mut(id).map(|post| {
            post.metrics.views = post.metrics.views.saturating_add(1);
            post.metrics.views
        }))
    }

    async fn related(&self, post: &Post, limit: u32) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        let candidates: Vec<Post> = published(&state)
            .filter(|other| other.id != post.id && other.category == post.category)
            .filter(|other| {
                post.tags.is_empty() || other.tags.iter().any(|tag| post.tags.contains(tag))
            })
            .cloned()
            .collect();
        Ok(take_page(newest_first(candidates), 0, limit))
    }

    async fn search(&self, term: &str, limit: u32) -> Result<Vec<Post>, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        let hits: Vec<Post> = published(&state)
            .filter(|post| {
                contains_ignore_case(&post.title, term)
                    || contains_ignore_case(&post.excerpt, term)
                    || post.tags.iter().any(|tag| contains_ignore_case(tag, term))
            })
            .cloned()
            .collect();
        Ok(take_page(newest_first(hits), 0, limit))
    }

    async fn tag_counts(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<TagCount>, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for tag in published(&state).flat_map(|post| post.tags.iter()) {
            if contains_ignore_case(tag, term) {
                *counts.entry(tag.as_str()).or_default() += 1;
            }
        }
        let mut tags: Vec<TagCount> = counts
            .into_iter()
            .map(|(name, count)| TagCount {
                name: name.to_owned(),
                count,
            })
            .collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(take_page(tags, 0, limit))
    }

    async fn count(&self, status: Option<PostStatus>) -> Result<u64, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        Ok(count(
            state
                .posts
                .values()
                .filter(|post| status.is_none_or(|status| post.status == status))
                .count(),
        ))
    }

    async fn count_in_category(
        &self,
        category: &CategoryId,
    ) -> Result<u64, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        Ok(count(
            state
                .posts
                .values()
                .filter(|post| post.category == *category)
                .count(),
        ))
    }

    async fn published_per_category(
        &self,
    ) -> Result<Vec<(CategoryId, u64)>, PostPersistenceError> {
        let state = self.lock().map_err(PostPersistenceError::query)?;
        let mut counts: HashMap<CategoryId, u64> = HashMap::new();
        for post in published(&state) {
            *counts.entry(post.category).or_default() += 1;
        }
        let mut counts: Vec<(CategoryId, u64)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::comment::{Comment, CommentStatus};
    use crate::domain::ports::CommentRepository;
    use crate::domain::services::test_fixtures::{Fixture, fixture_time};
    use crate::domain::CommentId;

    #[tokio::test]
    async fn like_toggles_and_counts() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let bob = fixture.user("Bob").await;
        let news = fixture.category("news").await;
        let post = fixture.post(&ada, &news, "hello", PostStatus::Published).await;
        let posts = &fixture.repos.posts;

        let first = posts.toggle_like(&post.id, &ada.id).await.expect("like");
        let second = posts.toggle_like(&post.id, &bob.id).await.expect("like");
        let third = posts.toggle_like(&post.id, &ada.id).await.expect("unlike");

        assert_eq!(first, Some(LikeOutcome { liked: true, like_count: 1 }));
        assert_eq!(second, Some(LikeOutcome { liked: true, like_count: 2 }));
        assert_eq!(third, Some(LikeOutcome { liked: false, like_count: 1 }));
        let stored = posts.find_by_id(&post.id).await.expect("find").expect("post");
        assert_eq!(stored.metrics.likes, 1);
    }

    #[tokio::test]
    async fn update_preserves_counters_and_rejects_taken_slugs() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        let post = fixture.post(&ada, &news, "hello", PostStatus::Published).await;
        fixture.post(&ada, &news, "taken", PostStatus::Draft).await;
        let posts = &fixture.repos.posts;
        posts.increment_views(&post.id).await.expect("view");

        let mut edited = post.clone();
        edited.title = "Edited title".to_owned();
        posts.update(&edited).await.expect("update");
        let stored = posts.find_by_id(&post.id).await.expect("find").expect("post");
        assert_eq!(stored.title, "Edited title");
        assert_eq!(stored.metrics.views, 1);

        edited.slug = "taken".to_owned();
        let err = posts.update(&edited).await.expect_err("duplicate");
        assert_eq!(err, PostPersistenceError::duplicate_slug("taken"));
    }

    #[tokio::test]
    async fn delete_cascades_to_comments() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        let post = fixture.post(&ada, &news, "hello", PostStatus::Published).await;
        let comment = Comment {
            id: CommentId::random(),
            content: "Nice".to_owned(),
            author: ada.id,
            post: post.id,
            parent: None,
            status: CommentStatus::Approved,
            created_at: fixture_time(),
            updated_at: fixture_time(),
        };
        fixture.repos.comments.insert(&comment).await.expect("comment");

        assert!(fixture.repos.posts.delete(&post.id).await.expect("delete"));
        assert!(!fixture.repos.posts.delete(&post.id).await.expect("repeat"));
        let found = fixture
            .repos
            .comments
            .find_by_id(&comment.id)
            .await
            .expect("lookup");
        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn search_matches_literal_terms_in_published_posts() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "hello", PostStatus::Published).await;
        fixture.post(&ada, &news, "hidden", PostStatus::Draft).await;

        let hits = fixture.repos.posts.search("POST", 10).await.expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "hello");
        let none = fixture.repos.posts.search(".*", 10).await.expect("search");
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn related_requires_shared_tag_in_same_category() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        let misc = fixture.category("misc").await;
        let subject = fixture.post(&ada, &news, "subject", PostStatus::Published).await;
        fixture.post(&ada, &news, "sibling", PostStatus::Published).await;
        fixture.post(&ada, &misc, "elsewhere", PostStatus::Published).await;
        let mut other_tags = fixture.post(&ada, &news, "other-tags", PostStatus::Draft).await;
        other_tags.tags = vec!["go".to_owned()];
        other_tags.status = PostStatus::Published;
        fixture.repos.posts.update(&other_tags).await.expect("update");

        let related = fixture.repos.posts.related(&subject, 5).await.expect("related");
        let slugs: Vec<&str> = related.iter().map(|post| post.slug.as_str()).collect();
        assert_eq!(slugs, vec!["sibling"]);
    }

    #[tokio::test]
    async fn tag_counts_rank_by_usage() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "one", PostStatus::Published).await;
        let mut two = fixture.post(&ada, &news, "two", PostStatus::Published).await;
        two.tags = vec!["rust".to_owned(), "rustacean".to_owned()];
        fixture.repos.posts.update(&two).await.expect("update");

        let tags = fixture.repos.posts.tag_counts("rust", 10).await.expect("tags");
        assert_eq!(
            tags,
            vec![
                TagCount { name: "rust".to_owned(), count: 2 },
                TagCount { name: "rustacean".to_owned(), count: 1 },
            ]
        );
    }
}
