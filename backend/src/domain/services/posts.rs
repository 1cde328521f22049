//! Post use-cases: listing, CRUD, likes, views and related posts.

use std::sync::Arc;

use mockable::Clock;
use pagination::{PageDefaults, PageRequest, Paginated};
use tracing::debug;

use crate::domain::post::{
    LikeOutcome, Post, PostDetails, PostFilter, PostInput, PostListParams, PostMetrics, PostPatch,
    PostQuery, PostSort, PostStatus,
};
use crate::domain::slug::{POST_SLUG_MAX, slug_base, unique_slug};
use crate::domain::validation::field_error;
use crate::domain::{Error, PostId, User};

use super::BlogRepositories;
use super::lookup::{
    find_category, hydrate_post, hydrate_posts, post_not_found, referenced_category,
    resolve_post, resolve_visible_post,
};

/// Default and maximum number of related posts.
pub const RELATED_DEFAULTS: PageDefaults = PageDefaults::with_limits(3, 10);

/// Post use-cases.
#[derive(Clone)]
pub struct PostService {
    repos: BlogRepositories,
    clock: Arc<dyn Clock>,
}

impl PostService {
    /// Create the service.
    pub fn new(repos: BlogRepositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// List posts. Anything other than the public `published` listing needs
    /// a viewer and is restricted to the viewer's own posts.
    pub async fn list(
        &self,
        params: PostListParams,
        viewer: Option<&User>,
        page: PageRequest,
    ) -> Result<Paginated<PostDetails>, Error> {
        let status = match params.status.as_deref().map(str::trim) {
            None | Some("") => Some(PostStatus::Published),
            Some("all") => None,
            Some(raw) => Some(
                raw.parse::<PostStatus>()
                    .map_err(|err| field_error("status", err.to_string()))?,
            ),
        };
        let author = if status == Some(PostStatus::Published) {
            None
        } else {
            let viewer =
                viewer.ok_or_else(|| Error::unauthorized("authentication required"))?;
            Some(viewer.id)
        };
        let category = match non_blank(params.category.as_deref()) {
            Some(raw) => Some(
                find_category(&self.repos, raw)
                    .await?
                    .ok_or_else(|| Error::not_found("category not found"))?
                    .id,
            ),
            None => None,
        };
        let sort = match non_blank(params.sort.as_deref()) {
            Some(raw) => PostSort::parse(raw)?,
            None => PostSort::default(),
        };
        let query = PostQuery {
            filter: PostFilter {
                status,
                author,
                category,
                tag: non_blank(params.tag.as_deref()).map(str::to_lowercase),
                search: non_blank(params.search.as_deref()).map(str::to_owned),
                featured_only: params.featured == Some(true),
            },
            sort,
            offset: page.offset(),
            limit: page.limit(),
        };
        let (posts, total) = self.repos.posts.list(&query).await?;
        let details = hydrate_posts(&self.repos, posts).await?;
        Ok(Paginated::new(details, page, total))
    }

    /// Create a post authored by `author`.
    pub async fn create(&self, input: PostInput, author: &User) -> Result<PostDetails, Error> {
        let input = input.validate()?;
        let category = referenced_category(&self.repos, &input.category, "category").await?;
        let base = slug_base(input.slug.as_deref(), &input.title, "post", POST_SLUG_MAX);
        let slug = self.free_slug(&base, None).await?;
        let now = self.clock.utc();
        let published_at = (input.status == PostStatus::Published)
            .then(|| input.published_at.unwrap_or(now));

        let post = Post {
            id: PostId::random(),
            title: input.title,
            slug,
            excerpt: input.excerpt,
            content: input.content,
            cover_image: input.cover_image,
            author: author.id,
            category: category.id,
            tags: input.tags,
            status: input.status,
            featured: input.featured,
            published_at,
            metrics: PostMetrics::default(),
            created_at: now,
            updated_at: now,
        };
        self.repos.posts.insert(&post).await?;
        debug!(post_id = %post.id, slug = %post.slug, "post created");
        hydrate_post(&self.repos, post).await
    }

    /// Fetch one post by id or slug.
    pub async fn get(&self, raw: &str, viewer: Option<&User>) -> Result<PostDetails, Error> {
        let post = resolve_visible_post(&self.repos, raw, viewer.map(|user| &user.id)).await?;
        hydrate_post(&self.repos, post).await
    }

    /// Apply a partial update. Only the author may edit a post.
    pub async fn update(
        &self,
        raw: &str,
        patch: PostPatch,
        editor: &User,
    ) -> Result<PostDetails, Error> {
        let mut post = self.owned_post(raw, editor).await?;
        let status = patch.apply_fields(&mut post)?;
        if let Some(reference) = patch.category.as_deref() {
            post.category = referenced_category(&self.repos, reference, "category")
                .await?
                .id;
        }
        if let Some(preferred) = patch.slug.as_deref().filter(|slug| !slug.trim().is_empty()) {
            let base = slug_base(Some(preferred), &post.title, "post", POST_SLUG_MAX);
            post.slug = self.free_slug(&base, Some(post.id)).await?;
        }
        let now = self.clock.utc();
        if let Some(status) = status {
            post.apply_status(status, now);
        }
        post.updated_at = now;
        self.repos.posts.update(&post).await?;
        hydrate_post(&self.repos, post).await
    }

    /// Delete a post with its comments and likes. Only the author may delete.
    pub async fn delete(&self, raw: &str, editor: &User) -> Result<(), Error> {
        let post = self.owned_post(raw, editor).await?;
        if !self.repos.posts.delete(&post.id).await? {
            return Err(post_not_found());
        }
        debug!(post_id = %post.id, "post deleted");
        Ok(())
    }

    /// Published posts related to the subject by category and tags.
    pub async fn related(
        &self,
        raw: &str,
        limit: Option<&str>,
    ) -> Result<Vec<PostDetails>, Error> {
        let post = resolve_visible_post(&self.repos, raw, None).await?;
        let limit = PageRequest::from_raw(None, limit, RELATED_DEFAULTS).limit();
        let related = self.repos.posts.related(&post, limit).await?;
        hydrate_posts(&self.repos, related).await
    }

    /// Toggle `user`'s like on a post.
    pub async fn toggle_like(&self, raw: &str, user: &User) -> Result<LikeOutcome, Error> {
        let post = resolve_visible_post(&self.repos, raw, Some(&user.id)).await?;
        self.repos
            .posts
            .toggle_like(&post.id, &user.id)
            .await?
            .ok_or_else(post_not_found)
    }

    /// Count a view and return the new total.
    pub async fn record_view(&self, raw: &str, viewer: Option<&User>) -> Result<u64, Error> {
        let post = resolve_visible_post(&self.repos, raw, viewer.map(|user| &user.id)).await?;
        self.repos
            .posts
            .increment_views(&post.id)
            .await?
            .ok_or_else(post_not_found)
    }

    async fn owned_post(&self, raw: &str, editor: &User) -> Result<Post, Error> {
        let post = resolve_post(&self.repos, raw).await?;
        if post.author != editor.id {
            if post.is_visible_to(Some(&editor.id)) {
                return Err(Error::forbidden("only the author may modify this post"));
            }
            return Err(post_not_found());
        }
        Ok(post)
    }

    async fn free_slug(&self, base: &str, exclude: Option<PostId>) -> Result<String, Error> {
        let posts = Arc::clone(&self.repos.posts);
        Ok(unique_slug(base, POST_SLUG_MAX, |candidate| {
            let posts = Arc::clone(&posts);
            async move { posts.slug_taken(&candidate, exclude).await }
        })
        .await?)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::post::{CONTENT_MIN, PostSortKey, SortDirection};
    use crate::domain::ports::{MockPostRepository, PostPersistenceError};
    use crate::domain::services::test_fixtures::{Fixture, fixture_time};
    use chrono::TimeDelta;
    use rstest::rstest;

    fn service(fixture: &Fixture) -> PostService {
        PostService::new(fixture.repos.clone(), fixture.clock())
    }

    fn input(title: &str, category: &str) -> PostInput {
        PostInput {
            title: title.to_owned(),
            excerpt: "An excerpt long enough".to_owned(),
            content: "b".repeat(CONTENT_MIN),
            category: category.to_owned(),
            tags: vec!["Rust".to_owned()],
            ..PostInput::default()
        }
    }

    fn first_page() -> PageRequest {
        PageRequest::from_raw(None, None, PageDefaults::STANDARD)
    }

    #[tokio::test]
    async fn create_generates_unique_slugs() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        fixture.category("news").await;
        let posts = service(&fixture);

        let first = posts.create(input("Hello World", "news"), &ada).await.expect("first");
        let second = posts.create(input("Hello, World!", "news"), &ada).await.expect("second");

        assert_eq!(first.post.slug, "hello-world");
        assert_eq!(second.post.slug, "hello-world-1");
        assert_eq!(first.post.status, PostStatus::Draft);
        assert_eq!(first.post.published_at, None);
        assert_eq!(first.author.expect("author").name, "Ada");
        assert_eq!(first.category.expect("category").slug, "news");
    }

    #[tokio::test]
    async fn colliding_long_titles_keep_slugs_within_bound() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        fixture.category("news").await;
        let posts = service(&fixture);
        let title = "a".repeat(120);

        let first = posts.create(input(&title, "news"), &ada).await.expect("first");
        let second = posts.create(input(&title, "news"), &ada).await.expect("second");

        assert_eq!(first.post.slug.len(), POST_SLUG_MAX);
        assert!(second.post.slug.len() <= POST_SLUG_MAX);
        assert!(second.post.slug.ends_with("a-1"));
        assert_ne!(first.post.slug, second.post.slug);
    }

    #[tokio::test]
    async fn create_rejects_unknown_category() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let err = service(&fixture)
            .create(input("Hello World", "missing"), &ada)
            .await
            .expect_err("unknown category");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert!(err.details().expect("details")["fields"].get("category").is_some());
    }

    #[tokio::test]
    async fn create_published_stamps_publication_time() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        let created = service(&fixture)
            .create(
                PostInput {
                    status: Some("published".to_owned()),
                    ..input("Fresh news today", &news.id.to_string())
                },
                &ada,
            )
            .await
            .expect("created");
        assert_eq!(created.post.published_at, Some(fixture_time()));
    }

    #[tokio::test]
    async fn drafts_are_hidden_from_other_viewers() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let bob = fixture.user("Bob").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "secret", PostStatus::Draft).await;
        let posts = service(&fixture);

        assert!(posts.get("secret", Some(&ada)).await.is_ok());
        let err = posts.get("secret", Some(&bob)).await.expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
        let err = posts.get("secret", None).await.expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_defaults_to_published_posts() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "live", PostStatus::Published).await;
        fixture.post(&ada, &news, "draft", PostStatus::Draft).await;

        let page = service(&fixture)
            .list(PostListParams::default(), None, first_page())
            .await
            .expect("listed");
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.data[0].post.slug, "live");
    }

    #[rstest]
    #[case(Some("draft"))]
    #[case(Some("all"))]
    #[tokio::test]
    async fn non_public_listing_requires_viewer(#[case] status: Option<&str>) {
        let fixture = Fixture::new();
        let params = PostListParams {
            status: status.map(str::to_owned),
            ..PostListParams::default()
        };
        let err = service(&fixture)
            .list(params, None, first_page())
            .await
            .expect_err("needs auth");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn draft_listing_is_scoped_to_viewer() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let bob = fixture.user("Bob").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "ada-draft", PostStatus::Draft).await;
        fixture.post(&bob, &news, "bob-draft", PostStatus::Draft).await;

        let params = PostListParams {
            status: Some("draft".to_owned()),
            ..PostListParams::default()
        };
        let page = service(&fixture)
            .list(params, Some(&ada), first_page())
            .await
            .expect("listed");
        let slugs: Vec<_> = page.data.iter().map(|d| d.post.slug.as_str()).collect();
        assert_eq!(slugs, vec!["ada-draft"]);
    }

    #[rstest]
    #[case(PostListParams { status: Some("bogus".to_owned()), ..PostListParams::default() }, ErrorCode::InvalidRequest)]
    #[case(PostListParams { sort: Some("-secret".to_owned()), ..PostListParams::default() }, ErrorCode::InvalidRequest)]
    #[case(PostListParams { category: Some("nowhere".to_owned()), ..PostListParams::default() }, ErrorCode::NotFound)]
    #[tokio::test]
    async fn list_rejects_bad_parameters(#[case] params: PostListParams, #[case] code: ErrorCode) {
        let fixture = Fixture::new();
        let err = service(&fixture)
            .list(params, None, first_page())
            .await
            .expect_err("rejected");
        assert_eq!(err.code(), code);
    }

    #[tokio::test]
    async fn update_is_author_only() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let bob = fixture.user("Bob").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "live", PostStatus::Published).await;

        let err = service(&fixture)
            .update("live", PostPatch::default(), &bob)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_keeps_slug_on_title_change_and_manages_status() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "draft", PostStatus::Draft).await;
        let posts = service(&fixture);
        fixture.clock.advance_seconds(60);

        let updated = posts
            .update(
                "draft",
                PostPatch {
                    title: Some("A brand new title".to_owned()),
                    status: Some("published".to_owned()),
                    ..PostPatch::default()
                },
                &ada,
            )
            .await
            .expect("updated");
        let later = fixture_time() + TimeDelta::seconds(60);
        assert_eq!(updated.post.slug, "draft");
        assert_eq!(updated.post.title, "A brand new title");
        assert_eq!(updated.post.published_at, Some(later));
        assert_eq!(updated.post.updated_at, later);

        let archived = posts
            .update(
                "draft",
                PostPatch {
                    status: Some("archived".to_owned()),
                    ..PostPatch::default()
                },
                &ada,
            )
            .await
            .expect("archived");
        assert_eq!(archived.post.published_at, None);
    }

    #[tokio::test]
    async fn update_applies_explicit_slug_uniquely() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "taken", PostStatus::Published).await;
        fixture.post(&ada, &news, "mine", PostStatus::Published).await;
        let posts = service(&fixture);

        let updated = posts
            .update(
                "mine",
                PostPatch {
                    slug: Some("Taken".to_owned()),
                    ..PostPatch::default()
                },
                &ada,
            )
            .await
            .expect("updated");
        assert_eq!(updated.post.slug, "taken-1");

        let unchanged = posts
            .update(
                "taken-1",
                PostPatch {
                    slug: Some("taken-1".to_owned()),
                    ..PostPatch::default()
                },
                &ada,
            )
            .await
            .expect("same slug");
        assert_eq!(unchanged.post.slug, "taken-1");
    }

    #[tokio::test]
    async fn like_toggles() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "live", PostStatus::Published).await;
        let posts = service(&fixture);

        let liked = posts.toggle_like("live", &ada).await.expect("liked");
        assert_eq!(liked, LikeOutcome { liked: true, like_count: 1 });
        let unliked = posts.toggle_like("live", &ada).await.expect("unliked");
        assert_eq!(unliked, LikeOutcome { liked: false, like_count: 0 });
    }

    #[tokio::test]
    async fn views_increment() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "live", PostStatus::Published).await;
        let posts = service(&fixture);

        assert_eq!(posts.record_view("live", None).await.expect("view"), 1);
        assert_eq!(posts.record_view("live", None).await.expect("view"), 2);
    }

    #[tokio::test]
    async fn delete_removes_post() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        let post = fixture.post(&ada, &news, "live", PostStatus::Published).await;
        let posts = service(&fixture);

        posts.delete(&post.id.to_string(), &ada).await.expect("deleted");
        let err = posts.get("live", None).await.expect_err("gone");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn related_limit_is_capped() {
        let fixture = Fixture::new();
        let ada = fixture.user("Ada").await;
        let news = fixture.category("news").await;
        fixture.post(&ada, &news, "subject", PostStatus::Published).await;
        for i in 0..12 {
            fixture
                .post(&ada, &news, &format!("other-{i}"), PostStatus::Published)
                .await;
        }
        let posts = service(&fixture);

        let default = posts.related("subject", None).await.expect("related");
        assert_eq!(default.len(), 3);
        let capped = posts.related("subject", Some("50")).await.expect("related");
        assert_eq!(capped.len(), 10);
        assert!(capped.iter().all(|d| d.post.slug != "subject"));
    }

    #[tokio::test]
    async fn repository_outage_maps_to_service_unavailable() {
        let fixture = Fixture::new();
        let mut failing = MockPostRepository::new();
        failing
            .expect_list()
            .returning(|_| Err(PostPersistenceError::connection("refused")));
        let mut repos = fixture.repos.clone();
        repos.posts = Arc::new(failing);
        let posts = PostService::new(repos, fixture.clock());

        let err = posts
            .list(PostListParams::default(), None, first_page())
            .await
            .expect_err("outage");
        assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
    }

    #[tokio::test]
    async fn list_passes_sort_to_repository() {
        let fixture = Fixture::new();
        let mut recording = MockPostRepository::new();
        recording
            .expect_list()
            .withf(|query| {
                query.sort == PostSort::by(PostSortKey::Views, SortDirection::Desc)
                    && query.offset == 10
                    && query.limit == 10
            })
            .returning(|_| Ok((Vec::new(), 0)));
        let mut repos = fixture.repos.clone();
        repos.posts = Arc::new(recording);
        let posts = PostService::new(repos, fixture.clock());

        let page = posts
            .list(
                PostListParams {
                    sort: Some("-views".to_owned()),
                    ..PostListParams::default()
                },
                None,
                PageRequest::from_raw(Some("2"), None, PageDefaults::STANDARD),
            )
            .await
            .expect("listed");
        assert_eq!(page.pagination.total_pages, 1);
    }
}
