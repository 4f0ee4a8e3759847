mod id;
mod season;
mod title;
mod year;

use crate::elements::ParsedMetadata;
use crate::keyword::{self, KeywordKind};

/// Video container extensions stripped from the end of a name.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "webm", "ts", "m2ts", "mpg", "mpeg", "flv", "ogm",
];

/// Parse a file or folder name into its component metadata.
///
/// Never fails: anything that cannot be recognized is left as `None`.
///
/// # Example
/// ```
/// let parsed = reelmatch_parse::parse("The.Matrix.1999.1080p.BluRay.x264-GROUP", false);
/// assert_eq!(parsed.clean_title, "The Matrix");
/// assert_eq!(parsed.year, Some(1999));
/// assert_eq!(parsed.quality_tag.as_deref(), Some("1080p"));
/// assert_eq!(parsed.release_group.as_deref(), Some("GROUP"));
/// ```
pub fn parse(raw_name: &str, is_series: bool) -> ParsedMetadata {
    let mut parsed = ParsedMetadata::default();

    // Step 1: Strip a known video extension.
    let mut work = strip_extension(raw_name.trim()).to_string();

    // Step 2: Extract an embedded catalog identifier and remove its token.
    if let Some(found) = id::extract(&work) {
        parsed.external_id = Some(found.id);
        parsed.id_source = Some(found.source);
        work.replace_range(found.span, " ");
    }

    // Step 3: Release year.
    let year = year::extract(&work);
    parsed.year = year.as_ref().map(|y| y.year);

    // Step 4: Quality and source tokens, searched across the whole name.
    let words = technical_words(&work);
    let in_tail = title::has_release_tail(&words);
    parsed.quality_tag = words
        .iter()
        .find_map(|w| keyword::resolution(w))
        .map(str::to_string);
    parsed.source = words
        .iter()
        .filter_map(|w| keyword::lookup_contextual(w, in_tail))
        .find(|e| e.kind == KeywordKind::Source)
        .and_then(|e| e.canonical)
        .map(str::to_string);
    parsed.release_group = title::find_release_group(&work, parsed.year);

    // Step 5: Everything before the year marker is the title.
    let title_part = match &year {
        Some(y) if y.start > 0 => work[..y.start].to_string(),
        Some(y) => format!("{} {}", &work[..y.start], &work[y.end..]),
        None => work.clone(),
    };
    let mut clean = title::clean(&title_part, parsed.release_group.as_deref());

    // Step 6: Series names also carry season/episode markers.
    if is_series {
        clean = season::strip(&clean, &mut parsed);
    }

    parsed.clean_title = clean;

    tracing::trace!(
        raw = raw_name,
        title = %parsed.clean_title,
        year = ?parsed.year,
        quality = ?parsed.quality_tag,
        external_id = ?parsed.external_id,
        "Parsed name"
    );

    parsed
}

/// Remove a trailing video extension, case-insensitively.
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty() && VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()) =>
        {
            stem
        }
        _ => name,
    }
}

/// Words of the full name, with brackets and dashes treated as separators, so
/// that "[1080p]" and "1080p-GRP" still yield "1080p".
fn technical_words(work: &str) -> Vec<String> {
    let debracketed: String = work
        .chars()
        .map(|c| match c {
            '[' | ']' | '(' | ')' | '{' | '}' => ' ',
            c => c,
        })
        .collect();

    let mut words = Vec::new();
    for word in title::split_words(&debracketed) {
        if keyword::lookup(&word).is_some() || !word.contains('-') {
            words.push(word);
        } else {
            words.extend(word.split('-').filter(|p| !p.is_empty()).map(str::to_string));
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::IdSource;

    #[test]
    fn test_scene_movie() {
        let p = parse("The.Matrix.1999.1080p.BluRay.x264-GROUP", false);
        assert_eq!(p.clean_title, "The Matrix");
        assert_eq!(p.year, Some(1999));
        assert_eq!(p.quality_tag.as_deref(), Some("1080p"));
        assert_eq!(p.source.as_deref(), Some("BluRay"));
        assert_eq!(p.release_group.as_deref(), Some("GROUP"));
        assert_eq!(p.external_id, None);
    }

    #[test]
    fn test_series_with_tvdb_id() {
        let p = parse("Show.Name.{tvdb-12345}.S01", true);
        assert_eq!(p.external_id, Some(12345));
        assert_eq!(p.id_source, Some(IdSource::Tvdb));
        assert_eq!(p.clean_title, "Show Name");
        assert!(!p.clean_title.contains("tvdb"));
        assert_eq!(p.season, Some(1));
    }

    #[test]
    fn test_plex_style_folder() {
        let p = parse("Heat (1995) {tmdb-949}", false);
        assert_eq!(p.clean_title, "Heat");
        assert_eq!(p.year, Some(1995));
        assert_eq!(p.external_id, Some(949));
        assert_eq!(p.id_source, Some(IdSource::Tmdb));
    }

    #[test]
    fn test_extension_stripped() {
        let p = parse("Arrival (2016).mkv", false);
        assert_eq!(p.clean_title, "Arrival");
        assert_eq!(p.year, Some(2016));

        let p = parse("Arrival (2016).MP4", false);
        assert_eq!(p.clean_title, "Arrival");
    }

    #[test]
    fn test_unknown_extension_kept() {
        assert_eq!(strip_extension("Movie.Name.x264-GRP"), "Movie.Name.x264-GRP");
        assert_eq!(strip_extension(".mkv"), ".mkv");
    }

    #[test]
    fn test_quality_alias_normalized() {
        let p = parse("Dune.Part.Two.2024.UHD.BluRay.x265", false);
        assert_eq!(p.quality_tag.as_deref(), Some("2160p"));
        assert_eq!(p.clean_title, "Dune Part Two");
    }

    #[test]
    fn test_bracketed_quality() {
        let p = parse("[Group] Movie Name (2010) [720p]", false);
        assert_eq!(p.clean_title, "Movie Name");
        assert_eq!(p.quality_tag.as_deref(), Some("720p"));
    }

    #[test]
    fn test_no_year_no_quality() {
        let p = parse("Some Home Video", false);
        assert_eq!(p.clean_title, "Some Home Video");
        assert_eq!(p.year, None);
        assert_eq!(p.quality_tag, None);
    }

    #[test]
    fn test_braced_five_digit_number_is_id_not_year() {
        let p = parse("Movie {12345} 2003", false);
        assert_eq!(p.external_id, Some(12345));
        assert_eq!(p.id_source, Some(IdSource::Unknown));
        assert_eq!(p.year, Some(2003));
        assert_eq!(p.clean_title, "Movie");
    }

    #[test]
    fn test_leading_year_marker_keeps_title() {
        let p = parse("(1999) Some Movie", false);
        assert_eq!(p.year, Some(1999));
        assert_eq!(p.clean_title, "Some Movie");
    }

    #[test]
    fn test_series_episode_release() {
        let p = parse("Show.Name.S02E05.Episode.Title.1080p.WEB.h264-GRP.mkv", true);
        assert_eq!(p.clean_title, "Show Name");
        assert_eq!(p.season, Some(2));
        assert_eq!(p.episode, Some(5));
        assert_eq!(p.quality_tag.as_deref(), Some("1080p"));
        assert_eq!(p.source.as_deref(), Some("WEB-DL"));
        assert_eq!(p.release_group.as_deref(), Some("GRP"));
    }

    #[test]
    fn test_series_with_year() {
        let p = parse("Doctor.Who.2005.S01E01.720p", true);
        assert_eq!(p.clean_title, "Doctor Who");
        assert_eq!(p.year, Some(2005));
    }

    #[test]
    fn test_series_markers_kept_for_movies() {
        let p = parse("Show Name Season 2", false);
        assert_eq!(p.clean_title, "Show Name Season 2");
    }

    #[test]
    fn test_deterministic() {
        let name = "Blade.Runner.1982.Final.Cut.1080p.BluRay.DTS.x264-GRP";
        assert_eq!(parse(name, false), parse(name, false));
    }

    #[test]
    fn test_title_words_matching_keywords() {
        let p = parse("Max.Headroom.S01E01.720p.HDTV.x264-GRP", true);
        assert_eq!(p.clean_title, "Max Headroom");
        assert_eq!(p.season, Some(1));
        assert_eq!(p.episode, Some(1));

        let p = parse("Mad.Max.Fury.Road.1080p.BluRay.x264-GRP", false);
        assert_eq!(p.clean_title, "Mad Max Fury Road");

        let p = parse("Internal.Affairs.1080p.BluRay.x264-GRP", false);
        assert_eq!(p.clean_title, "Internal Affairs");
        assert_eq!(p.source.as_deref(), Some("BluRay"));

        let p = parse("The.Last.Exorcism.Extended.Cut.S01.1080p.WEB-DL", true);
        assert_eq!(p.clean_title, "The Last Exorcism Extended Cut");
        assert_eq!(p.season, Some(1));
    }

    #[test]
    fn test_serializes_without_empty_fields() {
        let p = parse("Some Home Video", false);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json, serde_json::json!({ "clean_title": "Some Home Video" }));
    }
}
