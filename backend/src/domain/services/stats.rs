//! Dashboard statistics.

use std::collections::HashMap;

use crate::domain::comment::CommentStatus;
use crate::domain::post::{
    Post, PostFilter, PostQuery, PostSort, PostSortKey, PostStatus, SortDirection,
};
use crate::domain::stats::{
    CategoryStat, DashboardStats, HIGHLIGHT_LIMIT, Overview, PostHighlight, UNKNOWN_CATEGORY,
};
use crate::domain::{CategoryId, Error};

use super::BlogRepositories;

/// Statistics use-case.
#[derive(Clone)]
pub struct StatsService {
    repos: BlogRepositories,
}

impl StatsService {
    /// Create the service.
    pub fn new(repos: BlogRepositories) -> Self {
        Self { repos }
    }

    /// Gather every dashboard section.
    pub async fn dashboard(&self) -> Result<DashboardStats, Error> {
        let (total_posts, published_posts, total_comments, total_users) = tokio::try_join!(
            async { Ok::<_, Error>(self.repos.posts.count(None).await?) },
            async { Ok::<_, Error>(self.repos.posts.count(Some(PostStatus::Published)).await?) },
            async {
                Ok::<_, Error>(
                    self.repos
                        .comments
                        .count_with_status(CommentStatus::Approved)
                        .await?,
                )
            },
            async { Ok::<_, Error>(self.repos.users.count().await?) },
        )?;

        let popular_posts = self.highlights(PostSortKey::Views).await?;
        let latest_posts = self.highlights(PostSortKey::PublishedAt).await?;
        let category_stats = self.category_stats().await?;

        Ok(DashboardStats {
            overview: Overview {
                total_posts,
                published_posts,
                total_comments,
                total_users,
            },
            popular_posts,
            latest_posts,
            category_stats,
        })
    }

    async fn highlights(&self, key: PostSortKey) -> Result<Vec<PostHighlight>, Error> {
        let query = PostQuery {
            filter: PostFilter {
                status: Some(PostStatus::Published),
                ..PostFilter::default()
            },
            sort: PostSort::by(key, SortDirection::Desc),
            offset: 0,
            limit: HIGHLIGHT_LIMIT,
        };
        let (posts, _) = self.repos.posts.list(&query).await?;
        Ok(posts.iter().map(highlight).collect())
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>, Error> {
        let counts = self.repos.posts.published_per_category().await?;
        let ids: Vec<CategoryId> = counts.iter().map(|(id, _)| *id).collect();
        let categories: HashMap<CategoryId, (String, String)> = self
            .repos
            .categories
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|category| (category.id, (category.name, category.slug)))
            .collect();
        Ok(counts
            .into_iter()
            .map(|(category_id, count)| {
                let (name, slug) = match categories.get(&category_id) {
                    Some((name, slug)) => (name.clone(), Some(slug.clone())),
                    None => (UNKNOWN_CATEGORY.to_owned(), None),
                };
                CategoryStat {
                    category_id,
                    count,
                    name,
                    slug,
                }
            })
            .collect())
    }
}

fn highlight(post: &Post) -> PostHighlight {
    PostHighlight {
        id: post.id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        views: post.metrics.views,
        likes: post.metrics.likes,
        published_at: post.published_at,
    }
}
