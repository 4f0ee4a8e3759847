//! Batch reconciliation of scanned entries against the catalog.
//!
//! Entries the library already owns are settled locally first. The rest are
//! looked up in waves: every lookup in a wave runs concurrently, the wave is
//! joined before results are written back by position, and a short delay
//! separates waves to stay under the catalog's rate limits.

use std::fmt::Display;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use reelmatch_api::{CatalogCandidate, CatalogSearch, MediaKind};

use crate::library::DuplicateIndex;
use crate::models::{MatchResult, MatchStatus, Progress, ScannedEntry};
use crate::scorer::{self, ScoringPolicy};

/// Upper bound on lookups in flight at once.
pub const MAX_CONCURRENCY: usize = 20;
pub const DEFAULT_CONCURRENCY: usize = 5;
pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub kind: MediaKind,
    /// Requested lookups per wave; clamped to `1..=MAX_CONCURRENCY`.
    pub concurrency: usize,
    pub wave_delay: Duration,
    pub policy: ScoringPolicy,
}

impl ReconcileOptions {
    pub fn new(kind: MediaKind) -> Self {
        Self {
            kind,
            concurrency: DEFAULT_CONCURRENCY,
            wave_delay: DEFAULT_WAVE_DELAY,
            policy: ScoringPolicy::default(),
        }
    }

    pub fn wave_size(&self) -> usize {
        self.concurrency.clamp(1, MAX_CONCURRENCY)
    }
}

#[derive(Debug)]
pub struct ReconcileOutcome {
    pub results: Vec<MatchResult>,
    /// Set when the run was cancelled; unfinished entries stay pending.
    pub cancelled: bool,
}

/// What to send to the catalog for one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub year: Option<u32>,
}

impl SearchQuery {
    /// A tagged identifier is searched bare with no year; otherwise the clean
    /// title with its year.
    pub fn for_result(result: &MatchResult) -> Self {
        match result.parsed.external_id {
            Some(id) => Self {
                text: id.to_string(),
                year: None,
            },
            None => Self {
                text: result.parsed.clean_title.clone(),
                year: result.parsed.year,
            },
        }
    }
}

/// Parse every entry and settle the ones the library already owns.
///
/// Never touches the network.
pub fn prepare(entries: Vec<ScannedEntry>, kind: MediaKind, index: &DuplicateIndex) -> Vec<MatchResult> {
    entries
        .into_iter()
        .map(|entry| {
            let owned = index.is_already_imported(&entry, kind.is_series());
            let parsed = reelmatch_parse::parse(&entry.display_name, kind.is_series());
            let mut result = MatchResult::pending(entry, parsed);
            if owned {
                result.mark_in_library();
            }
            result
        })
        .collect()
}

/// Run a reconciliation pass.
///
/// `on_progress` fires once per completed wave. When `cancel` fires, the wave
/// in flight is discarded and no further waves start.
#[tracing::instrument(name = "reconcile", skip_all, fields(kind = %options.kind))]
pub async fn reconcile<S, P>(
    entries: Vec<ScannedEntry>,
    options: &ReconcileOptions,
    index: &DuplicateIndex,
    catalog: &S,
    mut on_progress: P,
    cancel: &CancellationToken,
) -> ReconcileOutcome
where
    S: CatalogSearch,
    P: FnMut(Progress),
{
    let mut results = prepare(entries, options.kind, index);

    let mut pending = Vec::new();
    for (position, result) in results.iter_mut().enumerate() {
        if result.status != MatchStatus::Pending {
            continue;
        }
        if result.parsed.is_searchable() {
            pending.push(position);
        } else {
            result.mark_unmatched("no searchable title");
        }
    }

    let wave_size = options.wave_size();
    let mut progress = Progress {
        current: 0,
        total: pending.len(),
    };
    let mut cancelled = false;

    tracing::info!(
        kind = %options.kind,
        entries = results.len(),
        lookups = pending.len(),
        wave_size,
        "Reconciliation started"
    );

    for (wave_index, wave) in pending.chunks(wave_size).enumerate() {
        if wave_index > 0 {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(options.wave_delay) => {}
            }
        }
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let span = tracing::debug_span!("wave", index = wave_index, size = wave.len());
        let started = Instant::now();

        let queries: Vec<(usize, SearchQuery)> = wave
            .iter()
            .map(|&position| (position, SearchQuery::for_result(&results[position])))
            .collect();
        let lookups = queries.into_iter().map(|(position, query)| async move {
            let response = catalog.search(&query.text, query.year, options.kind).await;
            (position, response)
        });
        let responses = join_all(lookups).instrument(span.clone()).await;

        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        for (position, response) in responses {
            apply_lookup(&mut results[position], response, &options.policy);
        }

        progress.current += wave.len();
        on_progress(progress);

        span.in_scope(|| {
            tracing::debug!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                done = progress.current,
                total = progress.total,
                "Wave complete"
            );
        });
    }

    if cancelled {
        tracing::info!(done = progress.current, total = progress.total, "Reconciliation cancelled");
    } else {
        let matched = results.iter().filter(|r| r.status == MatchStatus::Matched).count();
        let in_library = results.iter().filter(|r| r.status == MatchStatus::InLibrary).count();
        tracing::info!(
            matched,
            unmatched = results.iter().filter(|r| r.status == MatchStatus::Unmatched).count(),
            in_library,
            "Reconciliation finished"
        );
    }

    ReconcileOutcome { results, cancelled }
}

/// Score one lookup response into its result.
fn apply_lookup<E: Display>(
    result: &mut MatchResult,
    response: Result<Vec<CatalogCandidate>, E>,
    policy: &ScoringPolicy,
) {
    let candidates = match response {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(path = %result.entry.path, "Catalog lookup failed: {e}");
            result.mark_unmatched(format!("lookup failed: {e}"));
            return;
        }
    };

    let outcome = result
        .parsed
        .external_id
        .and_then(|id| scorer::identify(id, &candidates))
        .or_else(|| {
            scorer::score(
                &result.parsed.clean_title,
                &candidates,
                result.parsed.year,
                policy,
            )
        });

    match outcome {
        Some(outcome) => result.mark_matched(outcome, policy.auto_select_threshold),
        None => result.mark_unmatched("no catalog results"),
    }
}
