use serde::{Deserialize, Serialize};

use reelmatch_api::CatalogCandidate;
use reelmatch_parse::ParsedMetadata;

use crate::error::CoreError;
use crate::models::ScannedEntry;
use crate::scorer::{ScoreOutcome, MAX_ALTERNATES};

/// Where an entry sits in the reconcile/commit lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Pending,
    InLibrary,
    Matched,
    Unmatched,
    Importing,
    Imported,
    Error,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InLibrary => "in_library",
            Self::Matched => "matched",
            Self::Unmatched => "unmatched",
            Self::Importing => "importing",
            Self::Imported => "imported",
            Self::Error => "error",
        }
    }

    /// Whether `self → next` moves forward through the lifecycle.
    ///
    /// Statuses never go back to `Pending`, and a finished import never
    /// changes again.
    pub fn can_advance_to(self, next: MatchStatus) -> bool {
        use MatchStatus::*;
        matches!(
            (self, next),
            (Pending, InLibrary | Matched | Unmatched)
                | (Matched, Importing | InLibrary)
                | (Importing, Imported | Error)
        )
    }

    pub const ALL: &[MatchStatus] = &[
        Self::Pending,
        Self::InLibrary,
        Self::Matched,
        Self::Unmatched,
        Self::Importing,
        Self::Imported,
        Self::Error,
    ];
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-entry outcome of a reconciliation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub entry: ScannedEntry,
    pub parsed: ParsedMetadata,
    pub chosen: Option<CatalogCandidate>,
    pub confidence: Option<u8>,
    /// Up to four other candidates, in catalog order.
    pub alternates: Vec<CatalogCandidate>,
    pub display_title: Option<String>,
    pub status: MatchStatus,
    pub selected: bool,
    /// Why the entry is unmatched or failed to import.
    pub message: Option<String>,
}

impl MatchResult {
    pub fn pending(entry: ScannedEntry, parsed: ParsedMetadata) -> Self {
        Self {
            entry,
            parsed,
            chosen: None,
            confidence: None,
            alternates: Vec::new(),
            display_title: None,
            status: MatchStatus::Pending,
            selected: false,
            message: None,
        }
    }

    /// Move to `next`, rejecting backward or sideways moves.
    pub fn transition(&mut self, next: MatchStatus) -> Result<(), CoreError> {
        if !self.status.can_advance_to(next) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        if next != MatchStatus::Matched {
            self.selected = false;
        }
        Ok(())
    }

    /// Select or deselect the entry for commit.
    ///
    /// Only matched entries with a chosen candidate can be selected;
    /// deselecting always succeeds.
    pub fn set_selected(&mut self, selected: bool) -> Result<(), CoreError> {
        if selected && !self.is_selectable() {
            return Err(CoreError::NotSelectable(self.status));
        }
        self.selected = selected;
        Ok(())
    }

    pub fn is_selectable(&self) -> bool {
        self.status == MatchStatus::Matched && self.chosen.is_some()
    }

    /// Whether the next commit will try to add this entry.
    pub fn is_commit_ready(&self) -> bool {
        self.selected && self.chosen.is_some() && self.status != MatchStatus::InLibrary
    }

    /// Replace the chosen candidate with a user pick.
    ///
    /// The pick gets full confidence and leaves the alternates; the previous
    /// choice, if any, becomes the first alternate. Selection is untouched.
    pub fn rematch(&mut self, candidate: CatalogCandidate) -> Result<(), CoreError> {
        if !matches!(self.status, MatchStatus::Matched | MatchStatus::Unmatched) {
            return Err(CoreError::InvalidTransition {
                from: self.status,
                to: MatchStatus::Matched,
            });
        }

        self.alternates
            .retain(|alt| alt.external_id != candidate.external_id);
        if let Some(previous) = self.chosen.take() {
            if previous.external_id != candidate.external_id {
                self.alternates.insert(0, previous);
            }
        }
        self.alternates.truncate(MAX_ALTERNATES);

        self.display_title = Some(candidate.title.clone());
        self.chosen = Some(candidate);
        self.confidence = Some(100);
        self.status = MatchStatus::Matched;
        self.message = None;
        Ok(())
    }

    pub(crate) fn mark_in_library(&mut self) {
        self.status = MatchStatus::InLibrary;
        self.selected = false;
    }

    pub(crate) fn mark_unmatched(&mut self, reason: impl Into<String>) {
        self.status = MatchStatus::Unmatched;
        self.selected = false;
        self.message = Some(reason.into());
    }

    pub(crate) fn mark_matched(&mut self, outcome: ScoreOutcome, auto_select_threshold: u8) {
        self.selected = outcome.confidence >= auto_select_threshold;
        self.confidence = Some(outcome.confidence);
        self.display_title = Some(outcome.display_title);
        self.alternates = outcome.alternates;
        self.chosen = Some(outcome.chosen);
        self.status = MatchStatus::Matched;
        self.message = None;
    }
}
