use regex::Regex;
use std::sync::LazyLock;

use crate::keyword::{self, KeywordEntry, KeywordKind};

/// "[Group]", "(Director's Cut)", "{edition-x}".
static RE_BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)|\{[^}]*\}").unwrap());

/// "H.264", "x.265": dotted codec spellings collapse to their keyword form.
static RE_DOTTED_CODEC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([hx])\.(26[45])\b").unwrap());

/// "...x264-GROUP": a trailing dash-introduced suffix after the last word.
static RE_GROUP_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[.\s_])([^.\s_]+)-([A-Za-z0-9]+)$").unwrap());

/// Split a release name into words.
///
/// Spaces, underscores and dots separate words, except a dot between two
/// digits ("5.1", "2.0") which stays inside its word.
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut spaced = String::with_capacity(s.len());

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '_' => spaced.push(' '),
            '.' if !between_digits(&chars, i) => spaced.push(' '),
            c => spaced.push(c),
        }
    }

    spaced.split_whitespace().map(str::to_string).collect()
}

fn between_digits(chars: &[char], pos: usize) -> bool {
    let before = pos > 0 && chars[pos - 1].is_ascii_digit();
    let after = pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit();
    before && after
}

/// Whether any word is a technical token that can open a release tail, which
/// marks the name as a scene-style release and lets ambiguous keywords match.
pub fn has_release_tail(words: &[String]) -> bool {
    words.iter().any(|w| opens_tail(w))
}

/// Index of the first word of the release tail, if the name has one.
///
/// The tail opens at the first technical token, then extends back over
/// adjacent tags ("Movie.WEB.x264", "Movie.PROPER.1080p"). A leading tag is
/// never pulled into the tail, so "Internal.Affairs.1080p" keeps its first word.
pub fn release_tail_start(words: &[String]) -> Option<usize> {
    let mut start = words.iter().position(|w| opens_tail(w))?;
    while start > 1 && extends_tail(&words[start - 1]) {
        start -= 1;
    }
    Some(start)
}

fn opens_tail(word: &str) -> bool {
    keyword::lookup(word).is_some_and(KeywordEntry::opens_release_tail)
}

/// Streaming tags like "MAX" or "NF" are left out: in front of the tail they
/// are far more often the end of a title.
fn extends_tail(word: &str) -> bool {
    keyword::lookup(word).is_some_and(|e| e.kind != KeywordKind::StreamingSource)
}

/// Find a scene release group: the `-GROUP` suffix after a technical token.
///
/// "Movie.2019.1080p.x264-GRP" yields "GRP"; "Spider-Man" yields nothing
/// because "Spider" is not a technical token.
pub fn find_release_group(text: &str, year: Option<u32>) -> Option<String> {
    let text = text.trim_end();
    let caps = RE_GROUP_SUFFIX.captures(text)?;
    let before = &caps[1];
    let group = &caps[2];

    // "WEB-DL" at the end is a keyword in its own right, not "WEB" + group.
    if keyword::lookup(&format!("{before}-{group}")).is_some() {
        return None;
    }

    let after_year = year.is_some_and(|y| before == y.to_string());
    if keyword::lookup(before).is_some() || after_year {
        Some(group.to_string())
    } else {
        None
    }
}

/// Reduce the title portion of a name to a clean, human-readable title.
pub fn clean(title_part: &str, release_group: Option<&str>) -> String {
    let mut s = title_part.trim_end().to_string();

    if let Some(group) = release_group {
        if let Some(stripped) = s.strip_suffix(&format!("-{group}")) {
            s = stripped.to_string();
        }
    }

    let s = RE_BRACKETED.replace_all(&s, " ");
    let s = RE_DOTTED_CODEC.replace_all(&s, "${1}${2}");

    let mut words = split_words(&s);
    if let Some(start) = release_tail_start(&words) {
        words.truncate(start);
    }

    let kept: Vec<&str> = words
        .iter()
        .map(String::as_str)
        .filter(|w| !w.chars().all(|c| c == '-'))
        .collect();

    collapse(&kept.join(" "))
}

/// Collapse whitespace runs and trim stray separators from both ends.
pub fn collapse(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c.is_whitespace())
        .to_string()
}
