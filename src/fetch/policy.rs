//! What a surface should show for a controller's state

use super::controller::FetchController;
use super::state::FetchState;

/// Default number of failures tolerated before retrying is no longer offered
pub const DEFAULT_RETRY_LIMIT: u32 = 3;

/// Presentation-level cutoff for retries.
///
/// The controller keeps accepting `reload()` regardless; this only decides
/// whether a retry action is still worth offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub limit: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RETRY_LIMIT,
        }
    }
}

/// The view a surface should render, in priority order
#[derive(Debug, PartialEq)]
pub enum View<'a, P> {
    /// Nothing requested yet
    Prompt,
    /// Request in flight
    Loading,
    /// Payload available
    Ready(&'a P),
    /// Last request failed; offer a retry
    Retry { error_count: u32 },
    /// Too many failures; show a terminal unavailable message
    Unavailable,
}

impl RetryPolicy {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }

    /// More failures than the limit allows
    pub fn is_exhausted(&self, error_count: u32) -> bool {
        error_count > self.limit
    }

    pub fn view<'a, P>(&self, state: &'a FetchState<P>) -> View<'a, P> {
        if state.is_loading() {
            return View::Loading;
        }
        if let Some(data) = state.data() {
            return View::Ready(data);
        }
        if state.is_error() {
            if self.is_exhausted(state.error_count) {
                return View::Unavailable;
            }
            return View::Retry {
                error_count: state.error_count,
            };
        }
        View::Prompt
    }

    pub fn view_of<'a, P: Send + 'static>(&self, controller: &'a FetchController<P>) -> View<'a, P> {
        self.view(controller.state())
    }
}
