use async_trait::async_trait;

use crate::domain::CategoryId;
use crate::domain::category::{Category, CategoryFilter};
use crate::domain::ports::{CategoryPersistenceError, CategoryRepository};
use crate::domain::validation::contains_ignore_case;

use super::{MemoryBlogStore, State, take_page};

fn by_name(mut categories: Vec<Category>) -> Vec<Category> {
    categories.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    categories
}

fn slug_owner(state: &State, slug: &str, exclude: Option<CategoryId>) -> bool {
    state
        .categories
        .values()
        .any(|category| category.slug == slug && Some(category.id) != exclude)
}

#[async_trait]
impl CategoryRepository for MemoryBlogStore {
    async fn list(
        &self,
        filter: &CategoryFilter,
    ) -> Result<Vec<Category>, CategoryPersistenceError> {
        let state = self.lock().map_err(CategoryPersistenceError::query)?;
        Ok(by_name(
            state
                .categories
                .values()
                .filter(|category| filter.matches(category))
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_id(
        &self,
        id: &CategoryId,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let state = self.lock().map_err(CategoryPersistenceError::query)?;
        Ok(state.categories.get(id).cloned())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let state = self.lock().map_err(CategoryPersistenceError::query)?;
        Ok(state
            .categories
            .values()
            .find(|category| category.slug == slug)
            .cloned())
    }

    async fn find_many(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<Category>, CategoryPersistenceError> {
        let state = self.lock().map_err(CategoryPersistenceError::query)?;
        Ok(ids
            .iter()
            .filter_map(|id| state.categories.get(id))
            .cloned()
            .collect())
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, CategoryPersistenceError> {
        let state = self.lock().map_err(CategoryPersistenceError::query)?;
        Ok(slug_owner(&state, slug, exclude))
    }

    async fn insert(&self, category: &Category) -> Result<(), CategoryPersistenceError> {
        let mut state = self.lock().map_err(CategoryPersistenceError::query)?;
        if slug_owner(&state, &category.slug, None) {
            return Err(CategoryPersistenceError::duplicate_slug(
                category.slug.clone(),
            ));
        }
        state.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), CategoryPersistenceError> {
        let mut state = self.lock().map_err(CategoryPersistenceError::query)?;
        if slug_owner(&state, &category.slug, Some(category.id)) {
            return Err(CategoryPersistenceError::duplicate_slug(
                category.slug.clone(),
            ));
        }
        match state.categories.get_mut(&category.id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(())
            }
            None => Err(CategoryPersistenceError::query(format!(
                "category {} does not exist",
                category.id
            ))),
        }
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, CategoryPersistenceError> {
        let mut state = self.lock().map_err(CategoryPersistenceError::query)?;
        if !state.categories.contains_key(id) {
            return Ok(false);
        }
        if state.posts.values().any(|post| post.category == *id) {
            return Err(CategoryPersistenceError::in_use(id.to_string()));
        }
        state.categories.remove(id);
        for child in state.categories.values_mut() {
            if child.parent == Some(*id) {
                child.parent = None;
            }
        }
        Ok(true)
    }

    async fn search(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Category>, CategoryPersistenceError> {
        let state = self.lock().map_err(CategoryPersistenceError::query)?;
        let hits = state
            .categories
            .values()
            .filter(|category| category.is_visible)
            .filter(|category| {
                contains_ignore_case(&category.name, term)
                    || category
                        .description
                        .as_deref()
                        .is_some_and(|description| contains_ignore_case(description, term))
            })
            .cloned()
            .collect();
        Ok(take_page(by_name(hits), 0, limit))
    }
}
