//! Product name canonicalization for cross-region matching.

/// Apostrophes are dropped so "Men's" and "Mens" match.
const JOINING_CHARS: [char; 3] = ['\'', '’', '`'];

/// Canonicalizes a product name: case-folded, punctuation stripped,
/// whitespace collapsed.
///
/// The result contains only lowercase alphanumerics separated by single
/// spaces, so applying it twice yields the same string.
pub fn canonical_name(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            folded.push(c);
        } else if !JOINING_CHARS.contains(&c) {
            folded.push(' ');
        }
    }

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
