//! Small query helpers shared by the Diesel repositories.

/// `ILIKE` pattern matching `term` literally anywhere in the value.
///
/// Wildcards and the escape character in `term` are escaped so user input
/// never acts as a pattern.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Convert a page size for a `LIMIT` clause.
pub(crate) fn limit_to_db(limit: u32) -> i64 {
    i64::from(limit)
}

/// Convert a row offset for an `OFFSET` clause.
pub(crate) fn offset_to_db(offset: u64) -> i64 {
    i64::try_from(offset).unwrap_or(i64::MAX)
}
