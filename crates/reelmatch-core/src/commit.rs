//! Adding selected matches to the library.

use std::path::Path;

use serde::{Deserialize, Serialize};

use reelmatch_api::{LibraryAddRequest, LibraryService, MediaKind};

use crate::error::CoreError;
use crate::library::DuplicateIndex;
use crate::models::{MatchResult, MatchStatus};

/// Where and how a commit adds items.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitTarget {
    pub kind: MediaKind,
    pub profile_id: Option<u64>,
    pub root_folder: Option<String>,
    pub search_on_add: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Entries whose catalog item was already added earlier.
    pub skipped: usize,
}

/// Add every selected entry, one at a time.
///
/// A missing profile or root folder fails the whole commit before anything
/// is sent. After that, each entry succeeds or fails on its own and the
/// remaining entries are always attempted.
pub async fn commit<L, D>(
    results: &mut [MatchResult],
    target: &CommitTarget,
    destination: D,
    library: &L,
    index: &mut DuplicateIndex,
) -> Result<CommitSummary, CoreError>
where
    L: LibraryService,
    D: Fn(&str, &MatchResult) -> String,
{
    let profile_id = target.profile_id.ok_or(CoreError::MissingProfile)?;
    let root = target
        .root_folder
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .ok_or(CoreError::MissingDestination)?;

    let mut summary = CommitSummary::default();

    for result in results.iter_mut().filter(|r| r.is_commit_ready()) {
        let Some(chosen) = result.chosen.clone() else {
            continue;
        };

        if index.contains_external_id(chosen.external_id) {
            tracing::info!(
                external_id = chosen.external_id,
                path = %result.entry.path,
                "Already in library, skipping"
            );
            result.mark_in_library();
            summary.skipped += 1;
            continue;
        }

        if let Err(e) = result.transition(MatchStatus::Importing) {
            tracing::warn!(path = %result.entry.path, "Cannot import: {e}");
            summary.failed += 1;
            continue;
        }

        let folder_path = destination(root, result);
        let request = LibraryAddRequest {
            external_id: chosen.external_id,
            title: chosen.title.clone(),
            year: chosen.release_year(),
            poster_ref: chosen.poster_ref.clone(),
            folder_path: folder_path.clone(),
            profile_id,
            kind: target.kind,
            search_on_add: target.search_on_add,
        };

        match library.add(request).await {
            Ok(item) => {
                result.transition(MatchStatus::Imported)?;
                result.message = None;
                let path = if item.path.is_empty() { &folder_path } else { &item.path };
                index.record_import(chosen.external_id, path);
                summary.succeeded += 1;
                tracing::info!(external_id = chosen.external_id, folder = %path, "Added to library");
            }
            Err(e) => {
                result.transition(MatchStatus::Error)?;
                result.message = Some(e.to_string());
                summary.failed += 1;
                tracing::warn!(external_id = chosen.external_id, "Library add failed: {e}");
            }
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        skipped = summary.skipped,
        "Commit finished"
    );
    Ok(summary)
}

/// Default library folder for a match: `<root>/<Title> (<Year>)` for a
/// movie, `<root>/<Title>` for a series.
pub fn default_destination(kind: MediaKind, root: &str, result: &MatchResult) -> String {
    let title = result
        .display_title
        .as_deref()
        .or(result.chosen.as_ref().map(|c| c.title.as_str()))
        .unwrap_or(result.parsed.clean_title.as_str());
    let title = sanitize_folder_name(title);
    let year = result
        .chosen
        .as_ref()
        .and_then(|c| c.release_year())
        .or(result.parsed.year);

    let folder = match (kind, year) {
        (MediaKind::Movie, Some(year)) => format!("{title} ({year})"),
        _ => title,
    };
    Path::new(root).join(folder).to_string_lossy().into_owned()
}

/// Drop characters that are not allowed in folder names on common
/// filesystems.
fn sanitize_folder_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use reelmatch_api::{CatalogCandidate, LibraryItem};

    use crate::models::ScannedEntry;
    use crate::scorer::ScoreOutcome;

    #[derive(Debug, thiserror::Error)]
    #[error("rejected by library: {0}")]
    struct Rejected(String);

    /// Library that rejects a chosen set of external ids.
    #[derive(Default)]
    struct FakeLibrary {
        reject: Vec<u64>,
        calls: AtomicUsize,
        added: Mutex<Vec<LibraryAddRequest>>,
    }

    impl LibraryService for FakeLibrary {
        type Error = Rejected;

        async fn list_paths(&self, _kind: MediaKind) -> Result<Vec<String>, Rejected> {
            Ok(Vec::new())
        }

        async fn add(&self, request: LibraryAddRequest) -> Result<LibraryItem, Rejected> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) as u64;
            if self.reject.contains(&request.external_id) {
                return Err(Rejected(request.title));
            }
            let item = LibraryItem {
                id: call + 1,
                external_id: request.external_id,
                path: request.folder_path.clone(),
            };
            self.added.lock().unwrap().push(request);
            Ok(item)
        }
    }

    fn matched(id: u64, title: &str, year: u32) -> MatchResult {
        let mut result = MatchResult::pending(
            ScannedEntry {
                path: format!("/downloads/{title}.{year}.mkv"),
                display_name: format!("{title}.{year}.mkv"),
                size_bytes: 0,
            },
            reelmatch_parse::parse(&format!("{title}.{year}.mkv"), false),
        );
        result.mark_matched(
            ScoreOutcome {
                chosen: CatalogCandidate {
                    external_id: id,
                    title: title.into(),
                    original_title: None,
                    year: Some(year),
                    release_date: None,
                    poster_ref: Some(format!("/posters/{id}.jpg")),
                    overview: None,
                },
                confidence: 100,
                alternates: vec![],
                display_title: title.into(),
            },
            100,
        );
        result
    }

    fn target() -> CommitTarget {
        CommitTarget {
            kind: MediaKind::Movie,
            profile_id: Some(4),
            root_folder: Some("/library/movies".into()),
            search_on_add: true,
        }
    }

    fn destination(root: &str, result: &MatchResult) -> String {
        default_destination(MediaKind::Movie, root, result)
    }

    #[tokio::test]
    async fn test_failure_does_not_abort_batch() {
        let library = FakeLibrary {
            reject: vec![2],
            ..FakeLibrary::default()
        };
        let mut results = vec![matched(1, "Heat", 1995), matched(2, "Alien", 1979), matched(3, "Ran", 1985)];
        let mut index = DuplicateIndex::default();

        let summary = commit(&mut results, &target(), destination, &library, &mut index)
            .await
            .unwrap();

        assert_eq!(summary, CommitSummary { succeeded: 2, failed: 1, skipped: 0 });
        assert_eq!(library.calls.load(Ordering::SeqCst), 3);
        assert_eq!(results[0].status, MatchStatus::Imported);
        assert_eq!(results[1].status, MatchStatus::Error);
        assert_eq!(results[1].message.as_deref(), Some("rejected by library: Alien"));
        assert_eq!(results[2].status, MatchStatus::Imported);
        assert!(index.contains_external_id(1));
        assert!(!index.contains_external_id(2));
        assert!(results.iter().all(|r| !r.selected));
    }

    #[tokio::test]
    async fn test_request_fields() {
        let library = FakeLibrary::default();
        let mut results = vec![matched(949, "Heat", 1995)];
        commit(&mut results, &target(), destination, &library, &mut DuplicateIndex::default())
            .await
            .unwrap();

        let added = library.added.lock().unwrap();
        let request = &added[0];
        assert_eq!(request.external_id, 949);
        assert_eq!(request.profile_id, 4);
        assert_eq!(request.year, Some(1995));
        assert_eq!(request.folder_path, "/library/movies/Heat (1995)");
        assert_eq!(request.poster_ref.as_deref(), Some("/posters/949.jpg"));
        assert!(request.search_on_add);
    }

    #[tokio::test]
    async fn test_only_selected_entries() {
        let library = FakeLibrary::default();
        let mut results = vec![matched(1, "Heat", 1995), matched(2, "Alien", 1979)];
        results[1].set_selected(false).unwrap();

        let summary = commit(&mut results, &target(), destination, &library, &mut DuplicateIndex::default())
            .await
            .unwrap();

        assert_eq!(summary.succeeded, 1);
        assert_eq!(results[1].status, MatchStatus::Matched);
    }

    #[tokio::test]
    async fn test_same_external_id_added_once() {
        let library = FakeLibrary::default();
        let mut results = vec![matched(1, "Heat", 1995), matched(1, "Heat", 1995)];
        let mut index = DuplicateIndex::default();

        let summary = commit(&mut results, &target(), destination, &library, &mut index)
            .await
            .unwrap();

        assert_eq!(summary, CommitSummary { succeeded: 1, failed: 0, skipped: 1 });
        assert_eq!(results[1].status, MatchStatus::InLibrary);
        assert_eq!(library.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_commit_is_noop() {
        let library = FakeLibrary::default();
        let mut results = vec![matched(1, "Heat", 1995)];
        let mut index = DuplicateIndex::default();

        commit(&mut results, &target(), destination, &library, &mut index).await.unwrap();
        let again = commit(&mut results, &target(), destination, &library, &mut index)
            .await
            .unwrap();

        assert_eq!(again, CommitSummary::default());
        assert_eq!(library.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_committed_entries_are_final() {
        let library = FakeLibrary {
            reject: vec![2],
            ..FakeLibrary::default()
        };
        let mut results = vec![matched(1, "Heat", 1995), matched(2, "Alien", 1979)];
        commit(&mut results, &target(), destination, &library, &mut DuplicateIndex::default())
            .await
            .unwrap();

        for result in &mut results {
            let from = result.status;
            assert!(matches!(
                result.transition(MatchStatus::Importing),
                Err(CoreError::InvalidTransition { to: MatchStatus::Importing, .. })
            ));
            assert_eq!(result.status, from);
        }
    }

    #[tokio::test]
    async fn test_missing_profile_or_root() {
        let library = FakeLibrary::default();
        let mut results = vec![matched(1, "Heat", 1995)];

        let no_profile = CommitTarget { profile_id: None, ..target() };
        let err = commit(&mut results, &no_profile, destination, &library, &mut DuplicateIndex::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingProfile));

        let no_root = CommitTarget { root_folder: Some("  ".into()), ..target() };
        let err = commit(&mut results, &no_root, destination, &library, &mut DuplicateIndex::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::MissingDestination));

        assert_eq!(library.calls.load(Ordering::SeqCst), 0);
        assert_eq!(results[0].status, MatchStatus::Matched);
    }

    #[test]
    fn test_default_destination() {
        let mut result = matched(1, "Mission: Impossible", 1996);
        assert_eq!(
            default_destination(MediaKind::Movie, "/library/movies", &result),
            "/library/movies/Mission Impossible (1996)"
        );
        assert_eq!(
            default_destination(MediaKind::Series, "/library/tv/", &result),
            "/library/tv/Mission Impossible"
        );

        result.display_title = Some("What If...?".into());
        assert_eq!(
            default_destination(MediaKind::Series, "/library/tv", &result),
            "/library/tv/What If"
        );
    }
}
