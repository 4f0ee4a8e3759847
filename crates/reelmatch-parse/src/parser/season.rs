use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::elements::ParsedMetadata;

use super::title;

// ── Regex patterns ──────────────────────────────────────────────

/// "S01", "S01E02", "S01E02E03", "S01E02-E03".
static RE_SXXEYY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bS(\d{1,2})(?:\s?E(\d{1,3}))?(?:-?E\d{1,3})*\b").unwrap()
});

/// "1x02".
static RE_CROSS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})x(\d{2,3})\b").unwrap());

/// "Season 2", "Season02".
static RE_SEASON_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bseason\s?(\d{1,2})\b").unwrap());

/// "Episode 5", "Ep 5".
static RE_EPISODE_PHRASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:episode|ep)\s?(\d{1,3})\b").unwrap());

/// "Complete Series", "The Complete Seasons".
static RE_COMPLETE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:the\s)?complete\s(?:series|collection|seasons?)\b").unwrap()
});

/// Strip season/episode markers from a series title, recording the numbers.
///
/// An `SxxEyy`/`1x02` marker that follows the show name ends the title:
/// whatever comes after it is an episode title or release info.
pub fn strip(title_text: &str, parsed: &mut ParsedMetadata) -> String {
    let mut s = title_text.to_string();

    let marker = RE_SXXEYY
        .captures(&s)
        .or_else(|| RE_CROSS.captures(&s))
        .map(|caps| {
            record(parsed, &caps);
            caps.get(0).map(|m| m.range())
        });

    if let Some(Some(range)) = marker {
        if range.start > 0 {
            s.truncate(range.start);
        } else {
            s.replace_range(range, " ");
        }
    }

    if let Some(caps) = RE_SEASON_PHRASE.captures(&s) {
        if parsed.season.is_none() {
            parsed.season = caps[1].parse().ok();
        }
    }
    if let Some(caps) = RE_EPISODE_PHRASE.captures(&s) {
        if parsed.episode.is_none() {
            parsed.episode = caps[1].parse().ok();
        }
    }

    let s = RE_SEASON_PHRASE.replace_all(&s, " ");
    let s = RE_EPISODE_PHRASE.replace_all(&s, " ");
    let s = RE_COMPLETE.replace_all(&s, " ");

    title::collapse(&s)
}

fn record(parsed: &mut ParsedMetadata, caps: &Captures<'_>) {
    parsed.season = caps.get(1).and_then(|m| m.as_str().parse().ok());
    parsed.episode = caps.get(2).and_then(|m| m.as_str().parse().ok());
}
