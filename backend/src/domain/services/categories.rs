//! Category use-cases.

use std::collections::HashSet;
use std::sync::Arc;

use mockable::Clock;
use tracing::debug;

use crate::domain::category::{
    Category, CategoryFilter, CategoryInput, ParentChange, ValidatedCategoryInput,
};
use crate::domain::slug::{CATEGORY_SLUG_MAX, slug_base, unique_slug};
use crate::domain::validation::field_error;
use crate::domain::{CategoryId, Error};

use super::BlogRepositories;
use super::lookup::{find_category, referenced_category};

/// Category use-cases.
#[derive(Clone)]
pub struct CategoryService {
    repos: BlogRepositories,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    /// Create the service.
    pub fn new(repos: BlogRepositories, clock: Arc<dyn Clock>) -> Self {
        Self { repos, clock }
    }

    /// List categories sorted by name. `parent` must name an existing
    /// category.
    pub async fn list(
        &self,
        include_hidden: bool,
        parent: Option<&str>,
    ) -> Result<Vec<Category>, Error> {
        let parent = match parent.map(str::trim).filter(|value| !value.is_empty()) {
            Some(raw) => Some(referenced_category(&self.repos, raw, "parent").await?.id),
            None => None,
        };
        let filter = CategoryFilter {
            include_hidden,
            parent,
        };
        Ok(self.repos.categories.list(&filter).await?)
    }

    /// Fetch one category by id or slug.
    pub async fn get(&self, raw: &str) -> Result<Category, Error> {
        find_category(&self.repos, raw)
            .await?
            .ok_or_else(category_not_found)
    }

    /// Create a category with a generated unique slug.
    pub async fn create(&self, input: CategoryInput) -> Result<Category, Error> {
        let input = input.validate()?;
        let parent = match &input.parent {
            ParentChange::Set(raw) => Some(referenced_category(&self.repos, raw, "parent").await?.id),
            ParentChange::Keep | ParentChange::Clear => None,
        };
        let base = slug_base(input.slug.as_deref(), &input.name, "category", CATEGORY_SLUG_MAX);
        let slug = self.free_slug(&base, None).await?;
        let now = self.clock.utc();
        let ValidatedCategoryInput {
            name,
            description,
            icon,
            is_visible,
            ..
        } = input;
        let category = Category {
            id: CategoryId::random(),
            name,
            slug,
            description,
            icon,
            parent,
            is_visible: is_visible.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        self.repos.categories.insert(&category).await?;
        debug!(category_id = %category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    /// Replace a category's fields. The parent is only changed when the
    /// payload mentions it.
    pub async fn update(&self, raw: &str, input: CategoryInput) -> Result<Category, Error> {
        let input = input.validate()?;
        let mut category = self.get(raw).await?;

        match &input.parent {
            ParentChange::Keep => {}
            ParentChange::Clear => category.parent = None,
            ParentChange::Set(reference) => {
                let parent = referenced_category(&self.repos, reference, "parent").await?;
                self.ensure_not_ancestor(category.id, parent.id).await?;
                category.parent = Some(parent.id);
            }
        }
        if let Some(preferred) = input.slug.as_deref() {
            let base = slug_base(Some(preferred), &input.name, "category", CATEGORY_SLUG_MAX);
            category.slug = self.free_slug(&base, Some(category.id)).await?;
        }
        category.name = input.name;
        category.description = input.description;
        category.icon = input.icon;
        if let Some(visible) = input.is_visible {
            category.is_visible = visible;
        }
        category.updated_at = self.clock.utc();
        self.repos.categories.update(&category).await?;
        Ok(category)
    }

    /// Delete a category unless posts still reference it.
    pub async fn delete(&self, raw: &str) -> Result<(), Error> {
        let category = self.get(raw).await?;
        if self.repos.posts.count_in_category(&category.id).await? > 0 {
            return Err(Error::conflict(
                "category cannot be deleted while posts reference it",
            ));
        }
        if !self.repos.categories.delete(&category.id).await? {
            return Err(category_not_found());
        }
        debug!(category_id = %category.id, "category deleted");
        Ok(())
    }

    /// Fail when `candidate_parent` is `id` itself or one of its descendants.
    async fn ensure_not_ancestor(
        &self,
        id: CategoryId,
        candidate_parent: CategoryId,
    ) -> Result<(), Error> {
        let mut seen = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == id {
                return Err(field_error(
                    "parent",
                    "a category cannot be its own ancestor",
                ));
            }
            if !seen.insert(current) {
                break;
            }
            cursor = self
                .repos
                .categories
                .find_by_id(&current)
                .await?
                .and_then(|category| category.parent);
        }
        Ok(())
    }

    async fn free_slug(&self, base: &str, exclude: Option<CategoryId>) -> Result<String, Error> {
        let categories = Arc::clone(&self.repos.categories);
        Ok(unique_slug(base, CATEGORY_SLUG_MAX, |candidate| {
            let categories = Arc::clone(&categories);
            async move { categories.slug_taken(&candidate, exclude).await }
        })
        .await?)
    }
}

fn category_not_found() -> Error {
    Error::not_found("category not found")
}
