//! PostgreSQL-backed `CategoryRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::CategoryId;
use crate::domain::category::{Category, CategoryFilter};
use crate::domain::ports::{CategoryPersistenceError, CategoryRepository};

use super::diesel_error_mapping::{basic_error_mapping, classify};
use super::diesel_helpers::{contains_pattern, limit_to_db};
use super::models::{CategoryChanges, CategoryRow, NewCategoryRow};
use super::pool::DbPool;
use super::schema::categories;

const SLUG_CONSTRAINT: &str = "categories_slug_key";

basic_error_mapping!(CategoryPersistenceError);

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> CategoryPersistenceError {
    map_failure(classify(error, operation))
}

fn map_write_error(
    error: diesel::result::Error,
    operation: &str,
    slug: &str,
) -> CategoryPersistenceError {
    let failure = classify(error, operation);
    if failure.is_unique(SLUG_CONSTRAINT) {
        CategoryPersistenceError::duplicate_slug(slug)
    } else {
        map_failure(failure)
    }
}

fn into_categories(rows: Vec<CategoryRow>) -> Vec<Category> {
    rows.into_iter().map(Category::from).collect()
}

/// Diesel implementation of the category port.
#[derive(Clone)]
pub struct DieselCategoryRepository {
    pool: DbPool,
}

impl DieselCategoryRepository {
    /// Create a repository over `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for DieselCategoryRepository {
    async fn list(
        &self,
        filter: &CategoryFilter,
    ) -> Result<Vec<Category>, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = categories::table.into_boxed();
        if !filter.include_hidden {
            query = query.filter(categories::is_visible.eq(true));
        }
        if let Some(parent) = filter.parent {
            query = query.filter(categories::parent_id.eq(*parent.as_uuid()));
        }
        let rows: Vec<CategoryRow> = query
            .order_by((categories::name.asc(), categories::id.asc()))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list categories"))?;
        Ok(into_categories(rows))
    }

    async fn find_by_id(
        &self,
        id: &CategoryId,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CategoryRow> = categories::table
            .find(id.as_uuid())
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find category"))?;
        Ok(row.map(Category::from))
    }

    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Category>, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CategoryRow> = categories::table
            .filter(categories::slug.eq(slug))
            .select(CategoryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find category by slug"))?;
        Ok(row.map(Category::from))
    }

    async fn find_many(
        &self,
        ids: &[CategoryId],
    ) -> Result<Vec<Category>, CategoryPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::id.eq_any(uuids))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "load categories"))?;
        Ok(into_categories(rows))
    }

    async fn slug_taken(
        &self,
        slug: &str,
        exclude: Option<CategoryId>,
    ) -> Result<bool, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = categories::table
            .filter(categories::slug.eq(slug))
            .into_boxed();
        if let Some(exclude) = exclude {
            query = query.filter(categories::id.ne(*exclude.as_uuid()));
        }
        let owners: i64 = query
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "check category slug"))?;
        Ok(owners > 0)
    }

    async fn insert(&self, category: &Category) -> Result<(), CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewCategoryRow {
            id: *category.id.as_uuid(),
            created_at: category.created_at,
            changes: CategoryChanges::from(category),
        };
        diesel::insert_into(categories::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| map_write_error(err, "insert category", &category.slug))
    }

    async fn update(&self, category: &Category) -> Result<(), CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(categories::table.find(category.id.as_uuid()))
            .set(&CategoryChanges::from(category))
            .execute(&mut conn)
            .await
            .map_err(|err| map_write_error(err, "update category", &category.slug))?;
        if updated == 0 {
            return Err(CategoryPersistenceError::query(format!(
                "category {} does not exist",
                category.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &CategoryId) -> Result<bool, CategoryPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(categories::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(|err| {
                let failure = classify(err, "delete category");
                if failure.is_foreign_key() {
                    CategoryPersistenceError::in_use(id.to_string())
                } else {
                    map_failure(failure)
                }
            })?;
        Ok(deleted > 0)
    }

    async fn search(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Category>, CategoryPersistenceError> {
        let pattern = contains_pattern(term);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CategoryRow> = categories::table
            .filter(categories::is_visible.eq(true))
            .filter(
                categories::name
                    .ilike(pattern.clone())
                    .or(categories::description.ilike(pattern)),
            )
            .order_by((categories::name.asc(), categories::id.asc()))
            .limit(limit_to_db(limit))
            .select(CategoryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "search categories"))?;
        Ok(into_categories(rows))
    }
}
