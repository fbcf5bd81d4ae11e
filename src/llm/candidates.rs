//! Turning raw model output into a candidate list.

use std::collections::HashSet;

/// Trim surrounding whitespace, then drop one leading and one trailing `"`.
pub fn strip_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}

/// Strip quotes, drop empty entries, and remove duplicates keeping the
/// first occurrence.
pub fn normalize_candidates<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    raw.into_iter()
        .map(|text| strip_quotes(&text).to_string())
        .filter(|text| !text.is_empty())
        .filter(|text| seen.insert(text.clone()))
        .collect()
}
