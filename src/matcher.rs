//! Name normalization and fuzzy matching for the FIO search.
//!
//! A query matches a target when every normalized query token appears as a
//! substring of the target's whitespace-joined normalized tokens. Matching is
//! deliberately unanchored: the token "ан" matches inside "Иванов". That
//! over-matches short queries, which is the intended trade-off for partial
//! name input.

/// Normalize a name into lowercase tokens: strip everything that is not a
/// letter, digit, or whitespace, then split on whitespace runs.
pub fn normalize(name: &str) -> Vec<String> {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalized tokens joined by single spaces.
pub fn normalize_joined(name: &str) -> String {
    normalize(name).join(" ")
}

/// Whether `query` matches `target` under token-substring containment.
///
/// Empty queries and empty targets never match.
pub fn matches(query: &str, target: &str) -> bool {
    let query_tokens = normalize(query);
    if query_tokens.is_empty() {
        return false;
    }
    let target_joined = normalize_joined(target);
    if target_joined.is_empty() {
        return false;
    }
    query_tokens
        .iter()
        .all(|token| target_joined.contains(token.as_str()))
}
