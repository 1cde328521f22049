//! Classification of route identifiers into database ids or slugs.
//!
//! Posts and categories are addressable by either their UUID or their slug.
//! A value that parses as a hyphenated UUID is treated as an id; everything
//! else is looked up as a slug.

use std::fmt;

use uuid::Uuid;

use super::ids::parse_hyphenated;

/// A route parameter resolved to its lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceRef {
    /// Look up by primary key.
    Id(Uuid),
    /// Look up by unique slug.
    Slug(String),
}

/// Error raised when a route parameter cannot identify anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier must not be empty")]
pub struct EmptyIdentifier;

impl ResourceRef {
    /// Classify `raw` after trimming surrounding whitespace.
    ///
    /// # Examples
    /// ```
    /// use blog_backend::domain::ResourceRef;
    ///
    /// let by_id = ResourceRef::parse("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
    /// assert!(matches!(by_id, ResourceRef::Id(_)));
    ///
    /// let by_slug = ResourceRef::parse("hello-world").unwrap();
    /// assert_eq!(by_slug, ResourceRef::Slug("hello-world".into()));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, EmptyIdentifier> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmptyIdentifier);
        }
        Ok(parse_hyphenated(trimmed).map_or_else(
            || Self::Slug(trimmed.to_lowercase()),
            Self::Id,
        ))
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slug(slug) => f.write_str(slug),
        }
    }
}
