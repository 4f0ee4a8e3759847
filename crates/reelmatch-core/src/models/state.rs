use serde::{Deserialize, Serialize};

use reelmatch_api::MediaKind;

use crate::error::CoreError;
use crate::library::DuplicateIndex;
use crate::models::{MatchResult, MatchStatus};

/// Lookups finished so far out of the lookups a run needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.current >= self.total
    }
}

/// Counts per status bucket for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub already_in_library: usize,
    pub selected: usize,
}

/// The state of one reconciliation run, owned by whoever started it.
#[derive(Debug, Clone)]
pub struct ReconciliationState {
    pub kind: MediaKind,
    pub results: Vec<MatchResult>,
    pub index: DuplicateIndex,
}

impl ReconciliationState {
    pub fn new(kind: MediaKind, results: Vec<MatchResult>, index: DuplicateIndex) -> Self {
        Self {
            kind,
            results,
            index,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary {
            total: self.results.len(),
            ..RunSummary::default()
        };
        for result in &self.results {
            match result.status {
                MatchStatus::Matched => summary.matched += 1,
                MatchStatus::Unmatched => summary.unmatched += 1,
                MatchStatus::InLibrary => summary.already_in_library += 1,
                _ => {}
            }
            if result.selected {
                summary.selected += 1;
            }
        }
        summary
    }

    pub fn get(&self, position: usize) -> Option<&MatchResult> {
        self.results.get(position)
    }

    fn get_mut(&mut self, position: usize) -> Result<&mut MatchResult, CoreError> {
        self.results
            .get_mut(position)
            .ok_or(CoreError::NoSuchEntry(position))
    }

    pub fn set_selected(&mut self, position: usize, selected: bool) -> Result<(), CoreError> {
        self.get_mut(position)?.set_selected(selected)
    }

    pub fn rematch(
        &mut self,
        position: usize,
        candidate: reelmatch_api::CatalogCandidate,
    ) -> Result<(), CoreError> {
        self.get_mut(position)?.rematch(candidate)
    }

    /// Select every matched entry that has a candidate. Returns how many
    /// entries are selected afterwards.
    pub fn select_all_matched(&mut self) -> usize {
        for result in &mut self.results {
            if result.is_selectable() {
                result.selected = true;
            }
        }
        self.results.iter().filter(|r| r.selected).count()
    }

    pub fn deselect_all(&mut self) {
        for result in &mut self.results {
            result.selected = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScannedEntry;
    use crate::scorer::ScoreOutcome;
    use reelmatch_api::CatalogCandidate;

    fn entry(name: &str) -> MatchResult {
        MatchResult::pending(
            ScannedEntry {
                path: format!("/in/{name}"),
                display_name: name.into(),
                size_bytes: 0,
            },
            reelmatch_parse::parse(name, false),
        )
    }

    fn state() -> ReconciliationState {
        let candidate = CatalogCandidate {
            external_id: 1,
            title: "Heat".into(),
            original_title: None,
            year: Some(1995),
            release_date: None,
            poster_ref: None,
            overview: None,
        };

        let mut matched = entry("Heat (1995)");
        matched.mark_matched(
            ScoreOutcome {
                chosen: candidate.clone(),
                confidence: 85,
                alternates: vec![],
                display_title: "Heat".into(),
            },
            100,
        );
        let mut unmatched = entry("zzz");
        unmatched.mark_unmatched("no catalog results");
        let mut owned = entry("Alien (1979)");
        owned.mark_in_library();

        ReconciliationState::new(
            MediaKind::Movie,
            vec![matched, unmatched, owned],
            DuplicateIndex::default(),
        )
    }

    #[test]
    fn test_summary_buckets() {
        let summary = state().summary();
        assert_eq!(
            summary,
            RunSummary {
                total: 3,
                matched: 1,
                unmatched: 1,
                already_in_library: 1,
                selected: 0,
            }
        );
    }

    #[test]
    fn test_select_all_matched_skips_others() {
        let mut s = state();
        assert_eq!(s.select_all_matched(), 1);
        assert!(s.results[0].selected);
        assert!(!s.results[1].selected);
        assert!(!s.results[2].selected);

        s.deselect_all();
        assert_eq!(s.summary().selected, 0);
    }

    #[test]
    fn test_set_selected_out_of_range() {
        let mut s = state();
        assert!(matches!(
            s.set_selected(9, true),
            Err(CoreError::NoSuchEntry(9))
        ));
        assert!(s.set_selected(2, true).is_err());
    }

    #[test]
    fn test_progress_complete() {
        assert!(Progress { current: 3, total: 3 }.is_complete());
        assert!(!Progress { current: 1, total: 3 }.is_complete());
        assert!(Progress::default().is_complete());
    }
}
