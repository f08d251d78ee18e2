//! Error types for the workspace layer

use thiserror::Error;

/// Failures from the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt case data: {0}")]
    Corrupt(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

/// Failures surfaced to the editing session's caller.
///
/// Both variants are terminal for the attempt: drafts are never touched by a
/// failed fetch/save, so the user retries explicitly with nothing lost.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("A save is already in flight for this session")]
    SaveInFlight,
}
