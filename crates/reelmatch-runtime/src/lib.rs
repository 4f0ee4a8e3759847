//! A reconciliation session: scan, match, review, commit.
//!
//! `Session` owns the collaborators and the state of the current run. Only
//! one run exists at a time; starting another discards the previous one.

use std::path::Path;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use reelmatch_api::{CatalogCandidate, CatalogSearch, LibraryService, MediaKind, Scanner};
use reelmatch_core::commit::{self, default_destination, CommitSummary, CommitTarget};
use reelmatch_core::config::AppConfig;
use reelmatch_core::error::CoreError;
use reelmatch_core::library::DuplicateIndex;
use reelmatch_core::models::{MatchResult, Progress, ReconciliationState, RunSummary, ScannedEntry};
use reelmatch_core::reconcile;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("scan failed: {0}")]
    Scan(String),
    #[error("library error: {0}")]
    Library(String),
    #[error("no reconciliation run in progress")]
    NoActiveRun,
    #[error("reconciliation run was cancelled")]
    Cancelled,
    #[error(transparent)]
    Core(#[from] CoreError),
}

pub struct Session<S, C, L> {
    scanner: S,
    catalog: C,
    library: L,
    config: AppConfig,
    run: Option<ReconciliationState>,
    cancel: CancellationToken,
    progress: watch::Sender<Progress>,
}

impl<S, C, L> Session<S, C, L>
where
    S: Scanner,
    C: CatalogSearch,
    L: LibraryService,
{
    pub fn new(scanner: S, catalog: C, library: L, config: AppConfig) -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            scanner,
            catalog,
            library,
            config,
            run: None,
            cancel: CancellationToken::new(),
            progress,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Progress of the run in flight, updated once per wave.
    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Token that cancels the next (or current) run.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Scan `path` and reconcile everything found against the catalog.
    ///
    /// Replaces any previous run. A cancelled run leaves no state behind.
    pub async fn start(&mut self, path: &Path, kind: MediaKind) -> Result<RunSummary, RuntimeError> {
        self.run = None;
        self.progress.send_replace(Progress::default());

        let cancel = self.cancel.clone();
        let outcome = self.run_batch(path, kind, &cancel).await;
        // Each run gets its own token.
        self.cancel = CancellationToken::new();

        let state = outcome?;
        let summary = state.summary();
        tracing::info!(
            total = summary.total,
            matched = summary.matched,
            in_library = summary.already_in_library,
            selected = summary.selected,
            "Run ready for review"
        );
        self.run = Some(state);
        Ok(summary)
    }

    async fn run_batch(
        &self,
        path: &Path,
        kind: MediaKind,
        cancel: &CancellationToken,
    ) -> Result<ReconciliationState, RuntimeError> {
        if !self.catalog.is_configured() {
            return Err(RuntimeError::Config(
                "metadata catalog is not configured".into(),
            ));
        }

        let files = self
            .scanner
            .scan(path, kind)
            .await
            .map_err(|e| RuntimeError::Scan(e.to_string()))?;
        let library_paths = self
            .library
            .list_paths(kind)
            .await
            .map_err(|e| RuntimeError::Library(e.to_string()))?;
        let index = DuplicateIndex::build(&library_paths);

        tracing::debug!(
            path = %path.display(),
            files = files.len(),
            library = index.len(),
            "Scan complete"
        );

        let entries: Vec<ScannedEntry> = files.into_iter().map(ScannedEntry::from).collect();
        let options = self.config.reconcile_options(kind);
        let progress = &self.progress;

        let outcome = reconcile::reconcile(
            entries,
            &options,
            &index,
            &self.catalog,
            |p| {
                progress.send_replace(p);
            },
            cancel,
        )
        .await;

        if outcome.cancelled {
            return Err(RuntimeError::Cancelled);
        }
        Ok(ReconciliationState::new(kind, outcome.results, index))
    }

    /// Results of the current run, in scan order.
    pub fn results(&self) -> &[MatchResult] {
        self.run.as_ref().map(|r| r.results.as_slice()).unwrap_or_default()
    }

    pub fn summary(&self) -> Option<RunSummary> {
        self.run.as_ref().map(ReconciliationState::summary)
    }

    fn run_mut(&mut self) -> Result<&mut ReconciliationState, RuntimeError> {
        self.run.as_mut().ok_or(RuntimeError::NoActiveRun)
    }

    pub fn set_selected(&mut self, position: usize, selected: bool) -> Result<(), RuntimeError> {
        Ok(self.run_mut()?.set_selected(position, selected)?)
    }

    pub fn select_all_matched(&mut self) -> Result<usize, RuntimeError> {
        Ok(self.run_mut()?.select_all_matched())
    }

    pub fn deselect_all(&mut self) -> Result<(), RuntimeError> {
        self.run_mut()?.deselect_all();
        Ok(())
    }

    /// Replace an entry's match with a user pick.
    pub fn rematch(&mut self, position: usize, candidate: CatalogCandidate) -> Result<(), RuntimeError> {
        Ok(self.run_mut()?.rematch(position, candidate)?)
    }

    /// Commit selected entries using the configured profile and root folder.
    pub async fn commit(&mut self) -> Result<CommitSummary, RuntimeError> {
        let kind = self.run.as_ref().ok_or(RuntimeError::NoActiveRun)?.kind;
        let target = self.config.commit_target(kind);
        self.commit_to(&target).await
    }

    /// Commit selected entries to an explicit profile and root folder.
    pub async fn commit_to(&mut self, target: &CommitTarget) -> Result<CommitSummary, RuntimeError> {
        let state = self.run.as_mut().ok_or(RuntimeError::NoActiveRun)?;
        let kind = state.kind;
        let summary = commit::commit(
            &mut state.results,
            target,
            |root, result| default_destination(kind, root, result),
            &self.library,
            &mut state.index,
        )
        .await?;
        Ok(summary)
    }

    /// Drop the current run and cancel anything still pending.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.run = None;
        self.progress.send_replace(Progress::default());
    }
}
