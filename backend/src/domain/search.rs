//! Site search over posts, tags and categories.

use std::str::FromStr;

use super::category::Category;
use super::post::PostDetails;
use super::validation::{char_len, field_error};
use super::Error;

/// Minimum trimmed query length.
pub const QUERY_MIN: usize = 2;
/// Maximum hits per section.
pub const SECTION_LIMIT: u32 = 10;

/// Which sections a search fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    /// Every section.
    #[default]
    All,
    /// Posts only.
    Posts,
    /// Tags only.
    Tags,
    /// Categories only.
    Categories,
}

impl SearchScope {
    /// Whether posts are searched.
    #[must_use]
    pub fn posts(self) -> bool {
        matches!(self, Self::All | Self::Posts)
    }

    /// Whether tags are searched.
    #[must_use]
    pub fn tags(self) -> bool {
        matches!(self, Self::All | Self::Tags)
    }

    /// Whether categories are searched.
    #[must_use]
    pub fn categories(self) -> bool {
        matches!(self, Self::All | Self::Categories)
    }
}

impl FromStr for SearchScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(Self::All),
            "posts" => Ok(Self::Posts),
            "tags" => Ok(Self::Tags),
            "categories" => Ok(Self::Categories),
            _ => Err(field_error(
                "type",
                "type must be one of all, posts, tags, categories",
            )),
        }
    }
}

/// Validated search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    term: String,
    scope: SearchScope,
}

impl SearchQuery {
    /// Validate the raw `q` and `type` parameters.
    pub fn parse(term: Option<&str>, scope: Option<&str>) -> Result<Self, Error> {
        let term = term.map(str::trim).unwrap_or_default();
        if char_len(term) < QUERY_MIN {
            return Err(field_error(
                "q",
                format!("search term must be at least {QUERY_MIN} characters"),
            ));
        }
        let scope = scope.map(str::parse).transpose()?.unwrap_or_default();
        Ok(Self {
            term: term.to_owned(),
            scope,
        })
    }

    /// Trimmed literal term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    /// Requested sections.
    #[must_use]
    pub fn scope(&self) -> SearchScope {
        self.scope
    }
}

/// A tag with its usage count across published posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCount {
    /// Tag name.
    pub name: String,
    /// Number of published posts carrying it.
    pub count: u64,
}

/// Search results. Sections that were not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    /// Matching posts.
    pub posts: Option<Vec<PostDetails>>,
    /// Matching tags.
    pub tags: Option<Vec<TagCount>>,
    /// Matching categories.
    pub categories: Option<Vec<Category>>,
}
