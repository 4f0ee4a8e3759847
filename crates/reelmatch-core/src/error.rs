use thiserror::Error;

use crate::models::MatchStatus;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no quality profile selected")]
    MissingProfile,

    #[error("no destination root folder configured")]
    MissingDestination,

    #[error("cannot move from {from} to {to}")]
    InvalidTransition { from: MatchStatus, to: MatchStatus },

    #[error("entry cannot be selected while {0}")]
    NotSelectable(MatchStatus),

    #[error("no entry at position {0}")]
    NoSuchEntry(usize),
}
