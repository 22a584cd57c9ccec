//! Error types for timeline-engine operations.

use thiserror::Error;

/// Error type returned by storage collaborators (see [`crate::fetch`]).
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum TimelineError {
    /// An upstream fetch failed. The collaborator's error is kept as the source.
    #[error("Fetch failed: {0}")]
    Fetch(#[source] FetchError),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid energy level: {0}")]
    InvalidEnergy(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TimelineError>;
