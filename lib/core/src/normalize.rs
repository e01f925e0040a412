//! Text canonicalization shared by queries, roster cells and labels.

/// Lowercase, collapse whitespace runs to one space, trim both ends.
///
/// Never fails; empty input gives an empty string. Idempotent.
#[inline]
#[must_use]
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Missing cells normalize to the empty string.
#[inline]
#[must_use]
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// True when `text` is already in canonical form.
#[inline]
pub fn is_normalized(text: &str) -> bool {
    normalize(text) == text
}
