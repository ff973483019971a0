//! Fetch lifecycle state and its transition function

use std::sync::Arc;

use super::error::TransitionError;

/// Lifecycle phase of a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Nothing has been requested yet
    #[default]
    Idle,
    /// A request is in flight
    Loading,
    /// The last request produced a payload
    Success,
    /// The last request failed
    Failure,
}

/// Inputs to the transition function
#[derive(Debug)]
pub enum FetchEvent<P> {
    /// A request was issued for the armed target
    Started,
    /// The request produced a payload
    Succeeded(P),
    /// The request failed (network, status or decoding)
    Failed,
    /// The request was cancelled; not a failure
    Aborted,
}

impl<P> FetchEvent<P> {
    fn name(&self) -> &'static str {
        match self {
            FetchEvent::Started => "Started",
            FetchEvent::Succeeded(_) => "Succeeded",
            FetchEvent::Failed => "Failed",
            FetchEvent::Aborted => "Aborted",
        }
    }
}

/// Observable state of a fetch
#[derive(Debug)]
pub struct FetchState<P> {
    pub phase: Phase,
    /// Last successful payload. Kept while a new request loads, replaced on
    /// success and cleared on failure.
    data: Option<Arc<P>>,
    /// Failures since the last success
    pub error_count: u32,
}

impl<P> Default for FetchState<P> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            data: None,
            error_count: 0,
        }
    }
}

// Manual impl: cloning shares the payload and must not require `P: Clone`.
impl<P> Clone for FetchState<P> {
    fn clone(&self) -> Self {
        Self {
            phase: self.phase,
            data: self.data.clone(),
            error_count: self.error_count,
        }
    }
}

impl<P> FetchState<P> {
    pub fn data(&self) -> Option<&P> {
        self.data.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_error(&self) -> bool {
        self.phase == Phase::Failure
    }
}

/// Compute the state that follows `state` after `event`.
///
/// Settlement events (`Succeeded`, `Failed`, `Aborted`) are only valid while
/// `Loading`. Anything else is rejected without producing a state.
pub fn reduce<P>(state: &FetchState<P>, event: FetchEvent<P>) -> Result<FetchState<P>, TransitionError> {
    if !matches!(event, FetchEvent::Started) && state.phase != Phase::Loading {
        return Err(TransitionError {
            phase: state.phase,
            event: event.name(),
        });
    }

    let next = match event {
        FetchEvent::Started => FetchState {
            phase: Phase::Loading,
            data: state.data.clone(),
            error_count: state.error_count,
        },
        FetchEvent::Succeeded(payload) => FetchState {
            phase: Phase::Success,
            data: Some(Arc::new(payload)),
            error_count: 0,
        },
        FetchEvent::Failed => FetchState {
            phase: Phase::Failure,
            data: None,
            error_count: state.error_count.saturating_add(1),
        },
        FetchEvent::Aborted => state.clone(),
    };

    Ok(next)
}
