//! Title normalization for catalog matching.
//!
//! Canonicalizes free-text titles so that spelling differences that do not
//! change meaning ("Good/Bad" vs "good bad", "Tom & Jerry" vs "Tom and Jerry",
//! curly vs straight apostrophes) compare equal.
//!
//! `normalize` is pure and idempotent: `normalize(normalize(x)) == normalize(x)`.

use unicode_normalization::UnicodeNormalization;

/// Apply the full normalization pipeline.
///
/// Levels applied in order:
/// 1. Unicode NFKC + case folding
/// 2. Apostrophe unification
/// 3. Separator and conjunction unification (`/` → space, `&` → "and")
/// 4. Character filtering (letters, digits, spaces, apostrophes)
/// 5. Whitespace collapse
pub fn normalize(s: &str) -> String {
    let s = unicode_normalize(s);
    let s = unify_apostrophes(&s);
    let s = unify_separators(&s);
    let s = filter_characters(&s);
    collapse_whitespace(&s)
}

// ── Level 1: Unicode NFKC + case folding ──────────────────────────────

/// Apply NFKC normalization (fullwidth → ASCII, compose diacritics) and lowercase.
///
/// Lowercasing can leave text that is no longer in NFKC, so it is
/// normalized once more afterwards.
fn unicode_normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase().nfkc().collect()
}

// ── Level 2: Apostrophes ──────────────────────────────────────────────

/// Map curly quotes, modifier letters and backticks to a straight apostrophe.
fn unify_apostrophes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{02BC}' | '\u{0060}' => '\'',
            c => c,
        })
        .collect()
}

// ── Level 3: Separators and conjunctions ──────────────────────────────

/// `/` becomes a word break and `&` becomes the word "and", so that
/// "Tom & Jerry", "Tom&Jerry" and "Tom and Jerry" share one token.
fn unify_separators(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '/' => result.push(' '),
            '&' => result.push_str(" and "),
            c => result.push(c),
        }
    }
    result
}

// ── Level 4: Character filtering ──────────────────────────────────────

/// Keep letters, digits, whitespace and apostrophes; drop everything else.
fn filter_characters(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '\'')
        .collect()
}

// ── Level 5: Whitespace collapse ──────────────────────────────────────

/// Trim and collapse multiple whitespace runs to a single space.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
