use thiserror::Error;

use super::state::Phase;

/// Reasons a single request can fail to produce a payload
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Network-level failure (DNS, connect, timeout, body read)
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{url} returned {status}: {body}")]
    Status { status: u16, url: String, body: String },

    /// The body was not valid JSON for the expected payload
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request was cancelled before it completed
    #[error("request cancelled")]
    Cancelled,
}

impl FetchError {
    /// Cancellations are not failures and never count against the error budget
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

/// An event reached the transition function in a phase that cannot accept it.
///
/// This is a contract violation by the integration, not a runtime failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot apply {event} while {phase:?}")]
pub struct TransitionError {
    pub phase: Phase,
    pub event: &'static str,
}
