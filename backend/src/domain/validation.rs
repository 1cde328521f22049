//! Field-level validation helpers shared by the entity modules.
//!
//! Validation collects every failing field before giving up so clients can
//! render all problems at once. The resulting [`Error`] carries
//! `{"fields": {"<field>": "<message>"}}` in its details.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::Error;

/// Ordered collection of per-field validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    /// Start an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`. The first message per field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Record the error of `result` under `field` and return its value.
    pub fn check<T, E: std::fmt::Display>(
        &mut self,
        field: &'static str,
        result: Result<T, E>,
    ) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, err.to_string());
                None
            }
        }
    }

    /// Whether no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Message recorded for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Fail with an `invalid_request` error when any field failed.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// Convert into an `invalid_request` error regardless of content.
    #[must_use]
    pub fn into_error(self) -> Error {
        let fields: Map<String, Value> = self
            .0
            .into_iter()
            .map(|(field, message)| (field.to_owned(), Value::String(message)))
            .collect();
        Error::invalid_request("validation failed")
            .with_details(serde_json::json!({ "fields": fields }))
    }
}

/// Build an `invalid_request` error for a single field.
pub fn field_error(field: &'static str, message: impl Into<String>) -> Error {
    let mut errors = FieldErrors::new();
    errors.add(field, message);
    errors.into_error()
}

/// Number of Unicode scalar values in `value`.
pub(crate) fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Check a trimmed text field against inclusive character bounds.
pub(crate) fn text_in_range(
    label: &str,
    value: &str,
    min: usize,
    max: Option<usize>,
) -> Result<String, String> {
    let trimmed = value.trim();
    let length = char_len(trimmed);
    if length < min {
        return Err(format!("{label} must be at least {min} characters"));
    }
    if let Some(max) = max {
        if length > max {
            return Err(format!("{label} must be at most {max} characters"));
        }
    }
    Ok(trimmed.to_owned())
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^\S+@\S+\.\S+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Whether `value` looks like an email address (`something@host.tld`).
pub(crate) fn looks_like_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Case-insensitive literal substring test.
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Lowercase, trim, drop empty entries and de-duplicate tags preserving the
/// first occurrence.
///
/// # Examples
/// ```
/// use blog_backend::domain::validation::normalise_tags;
///
/// let tags = normalise_tags(["Rust", " rust ", "", "Async"]);
/// assert_eq!(tags, vec!["rust".to_owned(), "async".to_owned()]);
/// ```
pub fn normalise_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
