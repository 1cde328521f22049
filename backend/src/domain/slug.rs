//! Slug derivation and uniqueness.
//!
//! Slugs are lowercase ASCII letters, digits and single hyphens, with no
//! leading or trailing hyphen. Collisions are resolved by appending `-1`,
//! `-2`, ... to the base until the owning repository reports the value free.

use std::future::Future;

use uuid::Uuid;

/// Maximum slug length for posts.
pub const POST_SLUG_MAX: usize = 80;
/// Maximum slug length for categories.
pub const CATEGORY_SLUG_MAX: usize = 60;

/// Return `true` when `value` only uses slug characters and is non-empty.
///
/// This is the looser check applied to caller-supplied category slugs; it
/// allows repeated or edge hyphens, which [`slugify`] then normalises.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Derive a slug from `candidate`, truncated to `max_len` characters.
///
/// Every run of characters outside `[a-z0-9]` (after lowercasing) collapses
/// to one hyphen. Hyphens exposed at the end by truncation are trimmed too.
///
/// # Examples
/// ```
/// use blog_backend::domain::slug::slugify;
///
/// assert_eq!(slugify("  Hello, World!  ", 80), "hello-world");
/// assert_eq!(slugify("Rust & Async: Part 2", 80), "rust-async-part-2");
/// assert_eq!(slugify("abc def", 4), "abc");
/// ```
pub fn slugify(candidate: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(candidate.len());
    let mut pending_hyphen = false;
    for ch in candidate.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    // ASCII only, so byte and char lengths agree.
    slug.truncate(max_len);
    let trimmed_len = slug.trim_end_matches('-').len();
    slug.truncate(trimmed_len);
    slug
}

/// Pick the slug base for a resource: the preferred value when it slugifies
/// to something non-empty, else the title, else `<resource>-<8 hex>`.
///
/// # Examples
/// ```
/// use blog_backend::domain::slug::slug_base;
///
/// assert_eq!(slug_base(Some("Custom Slug"), "Title", "post", 80), "custom-slug");
/// assert_eq!(slug_base(None, "My Title", "post", 80), "my-title");
/// assert!(slug_base(None, "!!!", "post", 80).starts_with("post-"));
/// ```
pub fn slug_base(preferred: Option<&str>, title: &str, resource: &str, max_len: usize) -> String {
    let from_preferred = preferred
        .map(|value| slugify(value, max_len))
        .filter(|value| !value.is_empty());
    let base = from_preferred.unwrap_or_else(|| slugify(title, max_len));
    if base.is_empty() {
        fallback_slug(resource)
    } else {
        base
    }
}

fn fallback_slug(resource: &str) -> String {
    let simple = Uuid::new_v4().simple().to_string();
    let suffix: String = simple.chars().take(8).collect();
    format!("{resource}-{suffix}")
}

/// Find the first free slug among `base`, `base-1`, `base-2`, ...
///
/// Every candidate fits in `max_len` characters: the base is shortened to
/// make room for the suffix, dropping any hyphen the cut exposes. `is_taken`
/// is asked about each candidate in turn; the first candidate it reports as
/// free is returned. Errors from the lookup abort the search. Concurrent
/// callers may pick the same value; storage-level uniqueness constraints
/// reject the loser.
pub async fn unique_slug<F, Fut, E>(
    base: &str,
    max_len: usize,
    mut is_taken: F,
) -> Result<String, E>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let first = with_suffix(base, "", max_len);
    if !is_taken(first.clone()).await? {
        return Ok(first);
    }
    let mut counter: u64 = 1;
    loop {
        let candidate = with_suffix(base, &format!("-{counter}"), max_len);
        if !is_taken(candidate.clone()).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

fn with_suffix(base: &str, suffix: &str, max_len: usize) -> String {
    let room = max_len.saturating_sub(suffix.len());
    let stem = base.get(..room.min(base.len())).unwrap_or(base);
    format!("{}{suffix}", stem.trim_end_matches('-'))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::collections::HashSet;
    use std::convert::Infallible;

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Hello World", 80, "hello-world")]
    #[case("--Already--Hyphenated--", 80, "already-hyphenated")]
    #[case("Ünïcödé Tïtle", 80, "n-c-d-t-tle")]
    #[case("C++ & Rust", 80, "c-rust")]
    #[case("multiple   spaces\tand\nlines", 80, "multiple-spaces-and-lines")]
    #[case("", 80, "")]
    #[case("!!!", 80, "")]
    #[case("abcde fghij", 6, "abcde")]
    #[case("abcdefghij", 4, "abcd")]
    fn slugify_normalises(#[case] input: &str, #[case] max: usize, #[case] expected: &str) {
        assert_eq!(slugify(input, max), expected);
    }

    #[rstest]
    fn slugify_output_is_always_valid_or_empty() {
        for input in ["A b", "  x  ", "1-2-3", "___", "end-"] {
            let slug = slugify(input, 80);
            assert!(slug.is_empty() || is_valid_slug(&slug));
            assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            assert!(!slug.contains("--"));
        }
    }

    #[rstest]
    #[case("valid-slug", true)]
    #[case("-edge-", true)]
    #[case("UPPER", false)]
    #[case("has space", false)]
    #[case("", false)]
    fn slug_validation(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_slug(value), expected);
    }

    #[rstest]
    fn empty_preferred_falls_back_to_title() {
        assert_eq!(slug_base(Some("   "), "The Title", "post", 80), "the-title");
    }

    #[rstest]
    fn fallback_has_resource_prefix_and_hex_suffix() {
        let slug = slug_base(None, "???", "category", 60);
        let suffix = slug.strip_prefix("category-").expect("resource prefix");
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn unique_slug_returns_base_when_free() {
        let slug = unique_slug("hello", 80, |_| async { Ok::<_, Infallible>(false) })
            .await
            .expect("lookup succeeds");
        assert_eq!(slug, "hello");
    }

    #[tokio::test]
    async fn unique_slug_appends_incrementing_suffix() {
        let taken: HashSet<String> = ["hello", "hello-1", "hello-2"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        let slug = unique_slug("hello", 80, |candidate| {
            let hit = taken.contains(&candidate);
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .expect("lookup succeeds");
        assert_eq!(slug, "hello-3");
    }

    #[rstest]
    #[case(1, "aaaaaaa-1")]
    #[case(12, "aaaaaa-12")]
    #[tokio::test]
    async fn suffixed_slugs_stay_within_bound(#[case] taken_up_to: u64, #[case] expected: &str) {
        let base = "a".repeat(9);
        let mut taken: HashSet<String> = (1..taken_up_to)
            .map(|n| with_suffix(&base, &format!("-{n}"), 9))
            .collect();
        taken.insert(base.clone());
        let slug = unique_slug(&base, 9, |candidate| {
            let hit = taken.contains(&candidate);
            async move { Ok::<_, Infallible>(hit) }
        })
        .await
        .expect("lookup succeeds");
        assert_eq!(slug, expected);
        assert!(slug.len() <= 9);
    }

    #[rstest]
    fn cut_never_leaves_a_double_hyphen() {
        assert_eq!(with_suffix("abc-defgh", "-1", 6), "abc-1");
        assert_eq!(with_suffix("short", "-2", 80), "short-2");
    }

    #[tokio::test]
    async fn unique_slug_propagates_lookup_errors() {
        let result = unique_slug("hello", 80, |_| async { Err::<bool, _>("db down") }).await;
        assert_eq!(result, Err("db down"));
    }
}
