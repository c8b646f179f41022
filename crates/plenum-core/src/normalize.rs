//! Text normalisation shared by index construction and query time.
//!
//! Both sides of a comparison must go through [`normalize`]; any drift between
//! the two silently degrades similarity scores without raising an error.

/// Normalise text for similarity comparison.
///
/// Lower-cases, drops every character that is not a letter of the working
/// alphabet (`a`–`z`, `ä`, `ö`, `ü`, `ß`) or whitespace, collapses whitespace
/// runs to a single space and trims.
///
/// ```
/// use plenum_core::normalize;
/// assert_eq!(normalize("  Die Wirtschaft   wächst! (Beifall) "), "die wirtschaft wächst beifall");
/// ```
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if is_alphabet(c) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else if c.is_whitespace() {
            pending_space = true;
        }
        // Everything else (digits, punctuation, other scripts) is dropped
        // without acting as a word separator.
    }

    out
}

fn is_alphabet(c: char) -> bool {
    c.is_ascii_lowercase() || matches!(c, 'ä' | 'ö' | 'ü' | 'ß')
}
