//! Port for category persistence.

use async_trait::async_trait;

use crate::domain::CategoryId;
use crate::domain::category::{Category, CategoryFilter};

use super::define_port_error;

define_port_error! {
    /// Errors raised by category repository adapters.
    pub enum CategoryPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "category repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "category repository query failed: {message}",
        /// Another category already owns the slug.
        DuplicateSlug { slug: String } => "category slug already in use: {slug}",
        /// Posts still reference the category.
        InUse { id: String } => "category {id} is still referenced by posts",
    }
}

/// Storage of the category tree.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Categories matching `filter`, sorted by name.
    async fn list(&self, filter: &CategoryFilter)
    -> Result<Vec<Category>, CategoryPersistenceError>;

    /// Fetch a category by id.
    async fn find_by_id(&self, id: &CategoryId)
    -> Result<Option<Category>, CategoryPersistenceError>;

    /// Fetch a category by slug.
    async fn find_by_slug(&self, slug: &str)
    -> Result<Option<Category>, CategoryPersistenceError>;

    /// Fetch every category in `ids`. Unknown ids are skipped.
    async fn find_many(&self, ids: &[CategoryId])
    -> Result<Vec<Category>, CategoryPersistenceError>;

    /// Whether a category other than `exclude` owns `slug`.
    async fn slug_taken(
        &self,
        slug: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, CategoryPersistenceError>;

    /// Store a new category.
    async fn insert(&self, category: &Category) -> Result<(), CategoryPersistenceError>;

    /// Overwrite an existing category.
    async fn update(&self, category: &Category) -> Result<(), CategoryPersistenceError>;

    /// Delete a category; its children lose their parent. Returns `false`
    /// when it did not exist.
    async fn delete(&self, id: &CategoryId) -> Result<bool, CategoryPersistenceError>;

    /// Visible categories whose name or description contains `term`
    /// (case-insensitive, literal), sorted by name.
    async fn search(&self, term: &str, limit: u32)
    -> Result<Vec<Category>, CategoryPersistenceError>;
}
