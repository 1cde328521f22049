//! Post categories.

use chrono::{DateTime, Utc};

use super::slug::is_valid_slug;
use super::validation::{FieldErrors, char_len, text_in_range};
use super::{CategoryId, Error};

/// Icon assigned when a category does not name one.
pub const DEFAULT_ICON: &str = "category-default";
/// Name bounds.
pub const NAME_MIN: usize = 3;
/// Name bounds.
pub const NAME_MAX: usize = 60;
/// Maximum description length.
pub const DESCRIPTION_MAX: usize = 240;

/// A stored category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Stable identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Unique slug.
    pub slug: String,
    /// Optional description.
    pub description: Option<String>,
    /// Icon name.
    pub icon: String,
    /// Parent category.
    pub parent: Option<CategoryId>,
    /// Hidden categories are omitted from public listings.
    pub is_visible: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Category fields embedded in post responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySummary {
    /// Category id.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            slug: category.slug.clone(),
        }
    }
}

/// How a write treats the parent reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParentChange {
    /// Leave the stored parent untouched.
    #[default]
    Keep,
    /// Remove the parent.
    Clear,
    /// Point at the category with this id or slug.
    Set(String),
}

/// Raw create/update payload.
#[derive(Debug, Clone, Default)]
pub struct CategoryInput {
    /// Display name.
    pub name: String,
    /// Preferred slug.
    pub slug: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Icon name.
    pub icon: Option<String>,
    /// Parent reference.
    pub parent: ParentChange,
    /// Visibility flag.
    pub is_visible: Option<bool>,
}

/// Payload after field validation; the parent is still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedCategoryInput {
    /// Trimmed name.
    pub name: String,
    /// Preferred slug, syntactically valid when present.
    pub slug: Option<String>,
    /// Trimmed description, `None` when blank.
    pub description: Option<String>,
    /// Icon, defaulted.
    pub icon: String,
    /// Parent reference.
    pub parent: ParentChange,
    /// Visibility flag, if supplied.
    pub is_visible: Option<bool>,
}

impl CategoryInput {
    /// Validate every field, reporting all failures together.
    pub fn validate(self) -> Result<ValidatedCategoryInput, Error> {
        let mut errors = FieldErrors::new();
        let name = errors.check(
            "name",
            text_in_range("name", &self.name, NAME_MIN, Some(NAME_MAX)),
        );
        let slug = self
            .slug
            .map(|slug| slug.trim().to_owned())
            .filter(|slug| !slug.is_empty());
        if slug.as_deref().is_some_and(|slug| !is_valid_slug(slug)) {
            errors.add(
                "slug",
                "slug may only contain lowercase letters, digits and hyphens",
            );
        }
        let description = self
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());
        if description
            .as_deref()
            .is_some_and(|description| char_len(description) > DESCRIPTION_MAX)
        {
            errors.add(
                "description",
                format!("description must be at most {DESCRIPTION_MAX} characters"),
            );
        }
        if matches!(&self.parent, ParentChange::Set(parent) if parent.trim().is_empty()) {
            errors.add("parent", "parent must not be blank");
        }
        match name {
            Some(name) if errors.is_empty() => Ok(ValidatedCategoryInput {
                name,
                slug,
                description,
                icon: self
                    .icon
                    .map(|icon| icon.trim().to_owned())
                    .filter(|icon| !icon.is_empty())
                    .unwrap_or_else(|| DEFAULT_ICON.to_owned()),
                parent: self.parent,
                is_visible: self.is_visible,
            }),
            _ => Err(errors.into_error()),
        }
    }
}

/// Filters for a category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    /// Include hidden categories.
    pub include_hidden: bool,
    /// Restrict to children of this category.
    pub parent: Option<CategoryId>,
}

impl CategoryFilter {
    /// Whether `category` passes the filter.
    #[must_use]
    pub fn matches(&self, category: &Category) -> bool {
        (self.include_hidden || category.is_visible)
            && self
                .parent
                .is_none_or(|parent| category.parent == Some(parent))
    }
}
