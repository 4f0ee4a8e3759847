use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::elements::IdSource;

/// Result of a successful identifier extraction.
pub struct IdMatch {
    pub id: u64,
    pub source: IdSource,
    /// Byte span of the matched token, removed before further parsing.
    pub span: Range<usize>,
}

// ── Regex patterns, highest priority first ──────────────────────

/// "{tmdb-603}", "[tvdbid-12345]", "{tmdb=603}".
static RE_TAGGED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[\[{]\s*(tmdb|tvdb)(?:id)?\s*[-=:]?\s*(\d+)\s*[\]}]").unwrap()
});

/// "tmdbid-603", "tvdb_12345" without enclosing brackets.
static RE_BARE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(tmdb|tvdb)(?:id)?[-=_](\d+)\b").unwrap());

/// "{12345}": a bare braced number. Five digits minimum so a braced year
/// is never taken for an identifier.
static RE_BRACED_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\d{5,})\}").unwrap());

/// Try each identifier pattern in priority order; the first match wins.
pub fn extract(text: &str) -> Option<IdMatch> {
    try_prefixed(&RE_TAGGED, text)
        .or_else(|| try_prefixed(&RE_BARE_PREFIX, text))
        .or_else(|| try_braced_number(text))
}

fn try_prefixed(re: &Regex, text: &str) -> Option<IdMatch> {
    let caps = re.captures(text)?;
    let id: u64 = caps[2].parse().ok()?;
    let source = if caps[1].eq_ignore_ascii_case("tvdb") {
        IdSource::Tvdb
    } else {
        IdSource::Tmdb
    };
    Some(IdMatch {
        id,
        source,
        span: caps.get(0)?.range(),
    })
}

fn try_braced_number(text: &str) -> Option<IdMatch> {
    let caps = RE_BRACED_NUMBER.captures(text)?;
    let id: u64 = caps[1].parse().ok()?;
    Some(IdMatch {
        id,
        source: IdSource::Unknown,
        span: caps.get(0)?.range(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_braces() {
        let m = extract("Show.Name.{tvdb-12345}.S01").unwrap();
        assert_eq!(m.id, 12345);
        assert_eq!(m.source, IdSource::Tvdb);
        assert_eq!(&"Show.Name.{tvdb-12345}.S01"[m.span], "{tvdb-12345}");
    }

    #[test]
    fn test_tagged_brackets_with_id_suffix() {
        let m = extract("The Matrix (1999) [tmdbid-603]").unwrap();
        assert_eq!(m.id, 603);
        assert_eq!(m.source, IdSource::Tmdb);
    }

    #[test]
    fn test_bare_prefix() {
        let m = extract("Heat.1995.tmdbid-949.1080p").unwrap();
        assert_eq!(m.id, 949);
        assert_eq!(m.source, IdSource::Tmdb);
    }

    #[test]
    fn test_braced_number_is_last_resort() {
        let m = extract("Movie {123456}").unwrap();
        assert_eq!(m.id, 123456);
        assert_eq!(m.source, IdSource::Unknown);

        // A prefixed id elsewhere in the name takes priority.
        let m = extract("Movie {123456} {tmdb-42}").unwrap();
        assert_eq!(m.id, 42);
    }

    #[test]
    fn test_braced_year_is_not_an_id() {
        assert!(extract("Movie {1999}").is_none());
    }
}
