//! Ranks catalog candidates against a parsed title and year.
//!
//! Candidates are examined in catalog order. The running best only changes
//! on a strictly higher score, and the scan stops at the first candidate
//! scoring 100, so earlier catalog results win ties.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use reelmatch_api::CatalogCandidate;

use crate::normalize::normalize;

/// Most alternates kept beside the chosen candidate.
pub const MAX_ALTERNATES: usize = 4;

/// Tunable scoring constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Score every candidate starts from.
    pub base_confidence: u8,
    /// Minimum score for an exact (normalized) title match.
    pub exact_title_floor: u8,
    /// Minimum score when the release year matches.
    pub year_match_floor: u8,
    /// Minimum similarity when one title contains the other.
    pub containment_floor: u8,
    /// Fraction of shared words needed for a partial match.
    pub word_overlap_threshold: f64,
    /// Confidence at which a match is selected without review.
    pub auto_select_threshold: u8,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            base_confidence: 70,
            exact_title_floor: 85,
            year_match_floor: 90,
            containment_floor: 75,
            word_overlap_threshold: 0.70,
            auto_select_threshold: 100,
        }
    }
}

/// How closely two titles agree after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TitleSimilarity {
    pub exact: bool,
    pub score: u8,
}

impl TitleSimilarity {
    const NONE: Self = Self {
        exact: false,
        score: 0,
    };
}

/// The scorer's pick for one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreOutcome {
    pub chosen: CatalogCandidate,
    pub confidence: u8,
    pub alternates: Vec<CatalogCandidate>,
    pub display_title: String,
}

/// Compare a parsed title against one title variant.
///
/// Exact after normalization scores 100; containment scores the length
/// ratio with a floor; otherwise shared words count only above the overlap
/// threshold.
pub fn title_similarity(parsed: &str, variant: &str, policy: &ScoringPolicy) -> TitleSimilarity {
    let a = normalize(parsed);
    let b = normalize(variant);
    if a.is_empty() || b.is_empty() {
        return TitleSimilarity::NONE;
    }
    if a == b {
        return TitleSimilarity {
            exact: true,
            score: 100,
        };
    }

    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (&a, &b)
    } else {
        (&b, &a)
    };
    if longer.contains(shorter.as_str()) {
        let ratio = shorter.chars().count() as f64 / longer.chars().count() as f64;
        let score = (ratio * 100.0).round() as u8;
        return TitleSimilarity {
            exact: false,
            score: score.max(policy.containment_floor),
        };
    }

    let overlap = word_overlap(&a, &b);
    if overlap >= policy.word_overlap_threshold {
        TitleSimilarity {
            exact: false,
            score: (overlap * 100.0).round() as u8,
        }
    } else {
        TitleSimilarity::NONE
    }
}

/// Fraction of the shorter word list found in the longer one. Single
/// characters are ignored.
fn word_overlap(a: &str, b: &str) -> f64 {
    let words = |s: &str| -> Vec<String> {
        s.split_whitespace()
            .filter(|w| w.chars().count() > 1)
            .map(str::to_string)
            .collect()
    };
    let (wa, wb) = (words(a), words(b));
    let (shorter, longer) = if wa.len() <= wb.len() {
        (wa, wb)
    } else {
        (wb, wa)
    };
    if shorter.is_empty() {
        return 0.0;
    }
    let longer: HashSet<&str> = longer.iter().map(String::as_str).collect();
    let found = shorter.iter().filter(|w| longer.contains(w.as_str())).count();
    found as f64 / shorter.len() as f64
}

/// Score candidates using their primary and original-language titles.
pub fn score(
    parsed_title: &str,
    candidates: &[CatalogCandidate],
    parsed_year: Option<u32>,
    policy: &ScoringPolicy,
) -> Option<ScoreOutcome> {
    score_with(
        parsed_title,
        candidates,
        parsed_year,
        policy,
        CatalogCandidate::title_variants,
    )
}

/// Score candidates, taking title variants from `title_variants`.
///
/// Returns `None` only when `candidates` is empty.
pub fn score_with<'c, F>(
    parsed_title: &str,
    candidates: &'c [CatalogCandidate],
    parsed_year: Option<u32>,
    policy: &ScoringPolicy,
    title_variants: F,
) -> Option<ScoreOutcome>
where
    F: Fn(&'c CatalogCandidate) -> Vec<&'c str>,
{
    let mut best = candidates.first()?;
    let mut confidence = policy.base_confidence;
    let partial_ceiling = policy.exact_title_floor.saturating_sub(1);

    for candidate in candidates {
        let year_matches = parsed_year.is_some() && parsed_year == candidate.release_year();
        let mut match_score = policy.base_confidence;

        for variant in title_variants(candidate) {
            let similarity = title_similarity(parsed_title, variant, policy);
            if similarity.exact {
                match_score = match_score.max(policy.exact_title_floor);
                if year_matches {
                    match_score = 100;
                    break;
                }
            } else if similarity.score > 0 {
                match_score = match_score.max(similarity.score.min(partial_ceiling));
            }
        }

        if year_matches && match_score < policy.year_match_floor {
            match_score = policy.year_match_floor;
        }

        if match_score > confidence {
            confidence = match_score;
            best = candidate;
        }
        if confidence >= 100 {
            break;
        }
    }

    Some(ScoreOutcome {
        display_title: display_title(parsed_title, best, policy),
        alternates: alternates(candidates, best.external_id),
        chosen: best.clone(),
        confidence,
    })
}

/// Pick the candidate whose id matches a tagged identifier in the name.
pub fn identify(external_id: u64, candidates: &[CatalogCandidate]) -> Option<ScoreOutcome> {
    let hit = candidates.iter().find(|c| c.external_id == external_id)?;
    Some(ScoreOutcome {
        display_title: hit.title.clone(),
        alternates: alternates(candidates, external_id),
        chosen: hit.clone(),
        confidence: 100,
    })
}

/// The next distinct candidates after removing the chosen one.
fn alternates(candidates: &[CatalogCandidate], chosen_id: u64) -> Vec<CatalogCandidate> {
    let mut seen = HashSet::from([chosen_id]);
    candidates
        .iter()
        .filter(|c| seen.insert(c.external_id))
        .take(MAX_ALTERNATES)
        .cloned()
        .collect()
}

/// Prefer the original-language title when the name matches it better.
fn display_title(parsed_title: &str, candidate: &CatalogCandidate, policy: &ScoringPolicy) -> String {
    if let Some(original) = candidate.original_title.as_deref() {
        if !original.is_empty() && original != candidate.title {
            let to_original = title_similarity(parsed_title, original, policy);
            let to_primary = title_similarity(parsed_title, &candidate.title, policy);
            if to_original > to_primary {
                return original.to_string();
            }
        }
    }
    candidate.title.clone()
}
