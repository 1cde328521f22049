//! Literal, case-insensitive site search.

use crate::domain::Error;
use crate::domain::search::{SECTION_LIMIT, SearchQuery, SearchResults};

use super::BlogRepositories;
use super::lookup::hydrate_posts;

/// Search use-case.
#[derive(Clone)]
pub struct SearchService {
    repos: BlogRepositories,
}

impl SearchService {
    /// Create the service.
    pub fn new(repos: BlogRepositories) -> Self {
        Self { repos }
    }

    /// Fill the sections requested by `query`.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults, Error> {
        let scope = query.scope();
        let term = query.term();
        let mut results = SearchResults::default();
        if scope.posts() {
            let posts = self.repos.posts.search(term, SECTION_LIMIT).await?;
            results.posts = Some(hydrate_posts(&self.repos, posts).await?);
        }
        if scope.tags() {
            results.tags = Some(self.repos.posts.tag_counts(term, SECTION_LIMIT).await?);
        }
        if scope.categories() {
            results.categories = Some(self.repos.categories.search(term, SECTION_LIMIT).await?);
        }
        Ok(results)
    }
}
