mod entry;
mod result;
mod state;

pub use entry::ScannedEntry;
pub use result::{MatchResult, MatchStatus};
pub use state::{Progress, ReconciliationState, RunSummary};
