use bitflags::bitflags;
use phf::phf_map;

bitflags! {
    /// Flags controlling when a keyword matches.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct KeywordFlags: u8 {
        /// Only match this keyword inside a release tail, i.e. when the name
        /// also carries at least one unambiguous technical token.
        /// Prevents false positives for common words ("WEB", "HD", "CAM").
        const AMBIGUOUS = 0b0000_0001;
    }
}

/// The category a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordKind {
    Resolution,
    Source,
    StreamingSource,
    VideoCodec,
    VideoTerm,
    AudioCodec,
    AudioChannels,
    ReleaseInfo,
}

/// A keyword entry with its kind, matching flags and canonical spelling.
#[derive(Debug, Clone, Copy)]
pub struct KeywordEntry {
    pub kind: KeywordKind,
    pub flags: KeywordFlags,
    /// Canonical form reported for aliases (e.g. "UHD" → "2160p").
    pub canonical: Option<&'static str>,
}

impl KeywordEntry {
    const fn new(kind: KeywordKind) -> Self {
        Self {
            kind,
            flags: KeywordFlags::empty(),
            canonical: None,
        }
    }

    const fn ambiguous(kind: KeywordKind) -> Self {
        Self {
            kind,
            flags: KeywordFlags::AMBIGUOUS,
            canonical: None,
        }
    }

    const fn alias(kind: KeywordKind, canonical: &'static str) -> Self {
        Self {
            kind,
            flags: KeywordFlags::empty(),
            canonical: Some(canonical),
        }
    }

    const fn ambiguous_alias(kind: KeywordKind, canonical: &'static str) -> Self {
        Self {
            kind,
            flags: KeywordFlags::AMBIGUOUS,
            canonical: Some(canonical),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        self.flags.contains(KeywordFlags::AMBIGUOUS)
    }

    /// Whether this keyword alone marks the start of a release tail.
    /// Release info words ("INTERNAL", "PROPER") also occur in titles.
    pub fn opens_release_tail(&self) -> bool {
        !self.is_ambiguous() && self.kind != KeywordKind::ReleaseInfo
    }
}

/// Compile-time keyword lookup table.
/// All keys are UPPERCASE for case-insensitive matching.
pub static KEYWORDS: phf::Map<&'static str, KeywordEntry> = phf_map! {
    // ── Resolution ───────────────────────────────────────────────
    "480P" => KeywordEntry::alias(KeywordKind::Resolution, "480p"),
    "576P" => KeywordEntry::alias(KeywordKind::Resolution, "576p"),
    "720P" => KeywordEntry::alias(KeywordKind::Resolution, "720p"),
    "1080P" => KeywordEntry::alias(KeywordKind::Resolution, "1080p"),
    "1080I" => KeywordEntry::alias(KeywordKind::Resolution, "1080p"),
    "FHD" => KeywordEntry::alias(KeywordKind::Resolution, "1080p"),
    "2160P" => KeywordEntry::alias(KeywordKind::Resolution, "2160p"),
    "4K" => KeywordEntry::alias(KeywordKind::Resolution, "2160p"),
    "UHD" => KeywordEntry::alias(KeywordKind::Resolution, "2160p"),

    // ── Source ────────────────────────────────────────────────────
    "BLURAY" => KeywordEntry::alias(KeywordKind::Source, "BluRay"),
    "BLU-RAY" => KeywordEntry::alias(KeywordKind::Source, "BluRay"),
    "BDRIP" => KeywordEntry::alias(KeywordKind::Source, "BluRay"),
    "BRRIP" => KeywordEntry::alias(KeywordKind::Source, "BluRay"),
    "BDREMUX" => KeywordEntry::alias(KeywordKind::Source, "Remux"),
    "REMUX" => KeywordEntry::alias(KeywordKind::Source, "Remux"),
    "BD" => KeywordEntry::ambiguous_alias(KeywordKind::Source, "BluRay"),
    "WEB-DL" => KeywordEntry::alias(KeywordKind::Source, "WEB-DL"),
    "WEBDL" => KeywordEntry::alias(KeywordKind::Source, "WEB-DL"),
    "WEBRIP" => KeywordEntry::alias(KeywordKind::Source, "WEBRip"),
    "WEB-RIP" => KeywordEntry::alias(KeywordKind::Source, "WEBRip"),
    "WEB" => KeywordEntry::ambiguous_alias(KeywordKind::Source, "WEB-DL"),
    "HDTV" => KeywordEntry::alias(KeywordKind::Source, "HDTV"),
    "PDTV" => KeywordEntry::alias(KeywordKind::Source, "HDTV"),
    "HDRIP" => KeywordEntry::alias(KeywordKind::Source, "HDRip"),
    "DVDRIP" => KeywordEntry::alias(KeywordKind::Source, "DVD"),
    "DVD-RIP" => KeywordEntry::alias(KeywordKind::Source, "DVD"),
    "DVDR" => KeywordEntry::alias(KeywordKind::Source, "DVD"),
    "DVD5" => KeywordEntry::alias(KeywordKind::Source, "DVD"),
    "DVD9" => KeywordEntry::alias(KeywordKind::Source, "DVD"),
    "DVD" => KeywordEntry::ambiguous_alias(KeywordKind::Source, "DVD"),
    "DVDSCR" => KeywordEntry::alias(KeywordKind::Source, "Screener"),
    "SCREENER" => KeywordEntry::alias(KeywordKind::Source, "Screener"),
    "HDCAM" => KeywordEntry::alias(KeywordKind::Source, "CAM"),
    "CAM" => KeywordEntry::ambiguous_alias(KeywordKind::Source, "CAM"),
    "TELESYNC" => KeywordEntry::alias(KeywordKind::Source, "Telesync"),
    "TS" => KeywordEntry::ambiguous_alias(KeywordKind::Source, "Telesync"),

    // ── Streaming sources ────────────────────────────────────────
    "AMZN" => KeywordEntry::new(KeywordKind::StreamingSource),
    "ATVP" => KeywordEntry::new(KeywordKind::StreamingSource),
    "DSNP" => KeywordEntry::new(KeywordKind::StreamingSource),
    "HMAX" => KeywordEntry::new(KeywordKind::StreamingSource),
    "HULU" => KeywordEntry::new(KeywordKind::StreamingSource),
    "PCOK" => KeywordEntry::new(KeywordKind::StreamingSource),
    "NF" => KeywordEntry::ambiguous(KeywordKind::StreamingSource),
    "MAX" => KeywordEntry::ambiguous(KeywordKind::StreamingSource),

    // ── Video codecs ─────────────────────────────────────────────
    "X264" => KeywordEntry::new(KeywordKind::VideoCodec),
    "X265" => KeywordEntry::new(KeywordKind::VideoCodec),
    "H264" => KeywordEntry::new(KeywordKind::VideoCodec),
    "H265" => KeywordEntry::new(KeywordKind::VideoCodec),
    "HEVC" => KeywordEntry::new(KeywordKind::VideoCodec),
    "AVC" => KeywordEntry::new(KeywordKind::VideoCodec),
    "AV1" => KeywordEntry::new(KeywordKind::VideoCodec),
    "XVID" => KeywordEntry::new(KeywordKind::VideoCodec),
    "DIVX" => KeywordEntry::new(KeywordKind::VideoCodec),
    "VP9" => KeywordEntry::new(KeywordKind::VideoCodec),
    "VC1" => KeywordEntry::new(KeywordKind::VideoCodec),
    "VC-1" => KeywordEntry::new(KeywordKind::VideoCodec),

    // ── Video terms ──────────────────────────────────────────────
    "10BIT" => KeywordEntry::new(KeywordKind::VideoTerm),
    "10-BIT" => KeywordEntry::new(KeywordKind::VideoTerm),
    "8BIT" => KeywordEntry::new(KeywordKind::VideoTerm),
    "HDR" => KeywordEntry::new(KeywordKind::VideoTerm),
    "HDR10" => KeywordEntry::new(KeywordKind::VideoTerm),
    "HDR10+" => KeywordEntry::new(KeywordKind::VideoTerm),
    "HLG" => KeywordEntry::new(KeywordKind::VideoTerm),
    "DOVI" => KeywordEntry::new(KeywordKind::VideoTerm),
    "DV" => KeywordEntry::ambiguous(KeywordKind::VideoTerm),
    "SDR" => KeywordEntry::new(KeywordKind::VideoTerm),
    "HD" => KeywordEntry::ambiguous(KeywordKind::VideoTerm),

    // ── Audio codecs ─────────────────────────────────────────────
    "AAC" => KeywordEntry::new(KeywordKind::AudioCodec),
    "AAC2.0" => KeywordEntry::new(KeywordKind::AudioCodec),
    "AAC5.1" => KeywordEntry::new(KeywordKind::AudioCodec),
    "AC3" => KeywordEntry::new(KeywordKind::AudioCodec),
    "EAC3" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DD" => KeywordEntry::ambiguous(KeywordKind::AudioCodec),
    "DD2.0" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DD5.1" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DDP" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DDP2.0" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DDP5.1" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DDP7.1" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DTS" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DTS-HD" => KeywordEntry::new(KeywordKind::AudioCodec),
    "DTS-X" => KeywordEntry::new(KeywordKind::AudioCodec),
    "TRUEHD" => KeywordEntry::new(KeywordKind::AudioCodec),
    "ATMOS" => KeywordEntry::new(KeywordKind::AudioCodec),
    "FLAC" => KeywordEntry::new(KeywordKind::AudioCodec),
    "LPCM" => KeywordEntry::new(KeywordKind::AudioCodec),
    "MP3" => KeywordEntry::new(KeywordKind::AudioCodec),
    "OPUS" => KeywordEntry::ambiguous(KeywordKind::AudioCodec),

    // ── Audio channels ───────────────────────────────────────────
    "2.0" => KeywordEntry::ambiguous(KeywordKind::AudioChannels),
    "5.1" => KeywordEntry::ambiguous(KeywordKind::AudioChannels),
    "7.1" => KeywordEntry::ambiguous(KeywordKind::AudioChannels),
    "2CH" => KeywordEntry::new(KeywordKind::AudioChannels),
    "6CH" => KeywordEntry::new(KeywordKind::AudioChannels),

    // ── Release info ─────────────────────────────────────────────
    "PROPER" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "REPACK" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "RERIP" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "INTERNAL" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "LIMITED" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "REMASTERED" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "EXTENDED" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "UNRATED" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "UNCUT" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
    "DUBBED" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "SUBBED" => KeywordEntry::new(KeywordKind::ReleaseInfo),
    "MULTI" => KeywordEntry::ambiguous(KeywordKind::ReleaseInfo),
};

/// Look up a keyword (case-insensitive), ignoring flags.
pub fn lookup(s: &str) -> Option<&'static KeywordEntry> {
    KEYWORDS.get(s.to_uppercase().as_str())
}

/// Look up a keyword with contextual matching.
///
/// If `in_release_tail` is false, keywords with the `AMBIGUOUS` flag are
/// skipped, so short/common words like "WEB", "HD" or "CAM" survive when they
/// are more likely part of a title.
pub fn lookup_contextual(s: &str, in_release_tail: bool) -> Option<&'static KeywordEntry> {
    let entry = lookup(s)?;
    if !in_release_tail && entry.is_ambiguous() {
        return None;
    }
    Some(entry)
}

/// Canonical quality tag for a resolution token, if it is one.
pub fn resolution(s: &str) -> Option<&'static str> {
    let entry = lookup(s)?;
    match entry.kind {
        KeywordKind::Resolution => entry.canonical,
        _ => None,
    }
}
