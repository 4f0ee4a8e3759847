use regex::Regex;
use std::sync::LazyLock;

/// Result of a successful year extraction.
pub struct YearMatch {
    pub year: u32,
    /// Byte offset where the year marker (including its enclosing bracket or
    /// leading separator) begins. The title ends here.
    pub start: usize,
    pub end: usize,
}

// ── Regex patterns, highest priority first ──────────────────────

/// "(1999)", "[2004]".
static RE_ENCLOSED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[(\[]((?:19|20)\d{2})[)\]]").unwrap());

/// ".1999.", " 2004 ", "_2010-".
static RE_SEPARATED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.\s_\-]((?:19|20)\d{2})[.\s_\-]").unwrap());

/// "Title 1999" at the very end of the name.
static RE_TRAILING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.\s_\-]((?:19|20)\d{2})$").unwrap());

/// Try each year pattern in priority order; the first match wins.
pub fn extract(text: &str) -> Option<YearMatch> {
    [&*RE_ENCLOSED, &*RE_SEPARATED, &*RE_TRAILING]
        .into_iter()
        .find_map(|re| try_pattern(re, text))
}

fn try_pattern(re: &Regex, text: &str) -> Option<YearMatch> {
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;
    let year: u32 = caps[1].parse().ok()?;
    Some(YearMatch {
        year,
        start: whole.start(),
        end: whole.end(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosed() {
        let m = extract("Heat (1995) [1080p]").unwrap();
        assert_eq!(m.year, 1995);
        assert_eq!(m.start, 5);
    }

    #[test]
    fn test_enclosed_beats_separated() {
        let m = extract("Movie.2001.Remake (2010)").unwrap();
        assert_eq!(m.year, 2010);
    }

    #[test]
    fn test_separated() {
        let m = extract("The.Matrix.1999.1080p").unwrap();
        assert_eq!(m.year, 1999);
        assert_eq!(&"The.Matrix.1999.1080p"[..m.start], "The.Matrix");
    }

    #[test]
    fn test_trailing() {
        assert_eq!(extract("Arrival 2016").unwrap().year, 2016);
    }

    #[test]
    fn test_leading_number_title_is_not_a_year() {
        let m = extract("2012.2009.720p").unwrap();
        assert_eq!(m.year, 2009);
    }

    #[test]
    fn test_resolution_is_not_a_year() {
        assert!(extract("Movie.2160p.x265").is_none());
        assert!(extract("Movie.1080p").is_none());
    }
}
