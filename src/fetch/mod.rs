//! Asynchronous data fetching for UI surfaces.
//!
//! This module provides:
//!
//! - `FetchController`: owns the fetch lifecycle for a single target at a time
//! - `FetchState` and `reduce`: the pure transition function behind it
//! - `Fetcher` and `HttpFetcher`: the network seam and its reqwest implementation
//! - `RetryPolicy` and `View`: what a surface should show for the current state
//!
//! The controller never blocks. `fetch_lazy` and `reload` spawn the request on
//! the tokio runtime and return; results are folded into state by `poll` (from a
//! frame loop) or `settled` (from async code). Only the most recently issued
//! request may change state.

mod client;
mod controller;
mod error;
mod policy;
mod state;

pub use client::{Fetcher, HttpFetcher};
pub use controller::{FetchController, RequestId, Settlement};
pub use error::{FetchError, TransitionError};
pub use policy::{DEFAULT_RETRY_LIMIT, RetryPolicy, View};
pub use state::{FetchEvent, FetchState, Phase, reduce};
