//! Fetch controller: one armed target, one live request

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::client::Fetcher;
use super::error::FetchError;
use super::state::{FetchEvent, FetchState, Phase, reduce};

/// Identity of an issued request, increasing with every issue
pub type RequestId = u64;

/// What folding the latest request's outcome did to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// A payload was stored
    Succeeded,
    /// The request failed; `error_count` is the new failure count
    Failed { error_count: u32, message: String },
    /// The fetcher reported a cancellation; state was left as is
    Cancelled,
}

/// Target and reload token captured when a request is issued
#[derive(Debug, Clone, PartialEq, Eq)]
struct Trigger {
    target: String,
    token: u64,
}

/// A finished request, tagged with the id it was issued under
struct Completion<P> {
    id: RequestId,
    result: Result<P, FetchError>,
}

/// Drives fetches for a UI surface.
///
/// A request is issued only when a target is armed and either the target or
/// the reload token changed since the last issue. Outcomes are folded into
/// `FetchState` on the owning thread through `poll` or `settled`; a completion
/// whose id is not the latest issued one is discarded. Dropping the
/// controller aborts any request still in flight.
pub struct FetchController<P> {
    fetcher: Arc<dyn Fetcher<P>>,
    state: FetchState<P>,
    target: Option<String>,
    reload_token: u64,
    /// Snapshot of the last issue
    issued: Option<Trigger>,
    next_id: RequestId,
    /// Id of the request allowed to settle, if one is outstanding
    latest: Option<RequestId>,
    in_flight: Option<JoinHandle<()>>,
    completions_tx: mpsc::UnboundedSender<Completion<P>>,
    completions_rx: mpsc::UnboundedReceiver<Completion<P>>,
}

impl<P: Send + 'static> FetchController<P> {
    /// Create an idle controller with no target armed
    pub fn new(fetcher: impl Fetcher<P> + 'static) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        Self {
            fetcher: Arc::new(fetcher),
            state: FetchState::default(),
            target: None,
            reload_token: 0,
            issued: None,
            next_id: 0,
            latest: None,
            in_flight: None,
            completions_tx,
            completions_rx,
        }
    }

    /// Create a controller armed with `target`, issuing the first request immediately
    pub fn with_target(fetcher: impl Fetcher<P> + 'static, target: impl Into<String>) -> Self {
        let mut controller = Self::new(fetcher);
        controller.fetch_lazy(target);
        controller
    }

    /// Arm `target` and fetch it.
    ///
    /// Re-arming the target that was last issued does nothing until `reload`
    /// is called. A different target supersedes any request in flight.
    pub fn fetch_lazy(&mut self, target: impl Into<String>) {
        self.target = Some(target.into());
        self.sync();
    }

    /// Re-issue the request for the armed target.
    ///
    /// The reload token advances even with no target armed, but no request is
    /// made in that case.
    pub fn reload(&mut self) {
        self.reload_token = self.reload_token.wrapping_add(1);
        if self.target.is_none() {
            tracing::debug!("Reload requested with no target armed");
        }
        self.sync();
    }

    /// Fold any finished requests into state without waiting.
    ///
    /// Returns the settlement of the latest request if it finished since the
    /// last call.
    pub fn poll(&mut self) -> Option<Settlement> {
        let mut settlement = None;
        while let Ok(completion) = self.completions_rx.try_recv() {
            if let Some(s) = self.settle(completion) {
                settlement = Some(s);
            }
        }
        settlement
    }

    /// Wait until the latest issued request settles.
    ///
    /// Returns `None` immediately when nothing is outstanding.
    pub async fn settled(&mut self) -> Option<Settlement> {
        while self.latest.is_some() {
            // The controller holds a sender, so the channel never closes here
            let completion = self.completions_rx.recv().await?;
            if let Some(settlement) = self.settle(completion) {
                return Some(settlement);
            }
        }
        None
    }

    pub fn state(&self) -> &FetchState<P> {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_error(&self) -> bool {
        self.state.is_error()
    }

    pub fn data(&self) -> Option<&P> {
        self.state.data()
    }

    pub fn error_count(&self) -> u32 {
        self.state.error_count
    }

    /// Currently armed target
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    fn sync(&mut self) {
        let Some(target) = self.target.clone() else {
            return;
        };

        let trigger = Trigger {
            target,
            token: self.reload_token,
        };
        if self.issued.as_ref() == Some(&trigger) {
            return;
        }

        self.issue(trigger);
    }

    fn issue(&mut self, trigger: Trigger) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            if let Some(id) = self.latest {
                tracing::debug!("Request #{} superseded", id);
            }
        }

        self.next_id += 1;
        let id = self.next_id;
        self.latest = Some(id);
        self.apply(FetchEvent::Started);

        tracing::info!("Fetching {} (request #{})", trigger.target, id);

        let request = self.fetcher.fetch(&trigger.target);
        let completions = self.completions_tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let result = request.await;
            // Receiver is gone once the controller is dropped
            let _ = completions.send(Completion { id, result });
        }));

        self.issued = Some(trigger);
    }

    fn settle(&mut self, completion: Completion<P>) -> Option<Settlement> {
        if self.latest != Some(completion.id) {
            tracing::debug!("Discarding stale response for request #{}", completion.id);
            return None;
        }
        self.latest = None;
        self.in_flight = None;

        let (event, settlement) = match completion.result {
            Ok(payload) => (FetchEvent::Succeeded(payload), Settlement::Succeeded),
            Err(e) if e.is_cancelled() => {
                tracing::debug!("Request #{} was cancelled", completion.id);
                (FetchEvent::Aborted, Settlement::Cancelled)
            }
            Err(e) => {
                tracing::warn!("Request #{} failed: {}", completion.id, e);
                let settlement = Settlement::Failed {
                    error_count: self.state.error_count.saturating_add(1),
                    message: e.to_string(),
                };
                (FetchEvent::Failed, settlement)
            }
        };

        self.apply(event);
        Some(settlement)
    }

    fn apply(&mut self, event: FetchEvent<P>) {
        match reduce(&self.state, event) {
            Ok(next) => self.state = next,
            Err(e) => tracing::error!("Rejected fetch transition: {}", e),
        }
    }
}

impl<P> Drop for FetchController<P> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::future::BoxFuture;
    use serde::Deserialize;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, Deserialize, PartialEq)]
    struct Titled {
        title: String,
    }

    fn titled(title: &str) -> Titled {
        Titled {
            title: title.to_string(),
        }
    }

    fn failure() -> FetchError {
        FetchError::Status {
            status: 500,
            url: "https://x/bad".to_string(),
            body: String::new(),
        }
    }

    type Responder = oneshot::Sender<Result<Titled, FetchError>>;

    /// Records every request and lets the test decide when and how each resolves
    #[derive(Clone, Default)]
    struct MockFetcher {
        requests: Arc<Mutex<Vec<(String, Option<Responder>)>>>,
    }

    impl MockFetcher {
        fn calls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }

        fn take(&self, index: usize) -> Responder {
            self.requests.lock().unwrap()[index]
                .1
                .take()
                .expect("request already resolved")
        }

        fn resolve(&self, index: usize, result: Result<Titled, FetchError>) {
            // The request may have been aborted already
            let _ = self.take(index).send(result);
        }
    }

    impl Fetcher<Titled> for MockFetcher {
        fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Titled, FetchError>> {
            let (tx, rx) = oneshot::channel();
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), Some(tx)));
            async move { rx.await.unwrap_or(Err(FetchError::Cancelled)) }.boxed()
        }
    }

    #[tokio::test]
    async fn test_lazy_fetch_success() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());
        assert_eq!(controller.phase(), Phase::Idle);

        controller.fetch_lazy("https://x/ok");
        assert!(controller.is_loading());
        assert_eq!(mock.calls(), vec!["https://x/ok"]);

        mock.resolve(0, Ok(titled("T")));
        assert_eq!(controller.settled().await, Some(Settlement::Succeeded));

        assert_eq!(controller.phase(), Phase::Success);
        assert_eq!(controller.data(), Some(&titled("T")));
        assert_eq!(controller.error_count(), 0);
        assert!(!controller.is_loading());
        assert!(!controller.is_error());
    }

    #[tokio::test]
    async fn test_failures_accumulate_across_reloads() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("https://x/bad");
        mock.resolve(0, Err(failure()));
        let settlement = controller.settled().await;
        assert!(matches!(settlement, Some(Settlement::Failed { error_count: 1, .. })));
        assert!(controller.is_error());
        assert_eq!(controller.error_count(), 1);

        controller.reload();
        assert!(controller.is_loading());
        // Loading keeps the count
        assert_eq!(controller.error_count(), 1);

        mock.resolve(1, Err(failure()));
        controller.settled().await;
        assert!(controller.is_error());
        assert_eq!(controller.error_count(), 2);
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_consecutive_failures_then_success_resets_count() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("https://x/flaky");
        for n in 0..5 {
            if n > 0 {
                controller.reload();
            }
            mock.resolve(n, Err(failure()));
            controller.settled().await;
            assert_eq!(controller.error_count(), n as u32 + 1);
        }

        controller.reload();
        mock.resolve(5, Ok(titled("back")));
        controller.settled().await;
        assert_eq!(controller.error_count(), 0);
        assert_eq!(controller.data(), Some(&titled("back")));
    }

    #[tokio::test]
    async fn test_reload_without_target_is_noop() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.reload();
        controller.reload();

        assert_eq!(controller.phase(), Phase::Idle);
        assert!(mock.calls().is_empty());
        assert_eq!(controller.poll(), None);
        assert_eq!(controller.settled().await, None);
    }

    #[tokio::test]
    async fn test_reload_after_arming_issues_once_per_change() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        // Token advanced before any target; arming still issues exactly once
        controller.reload();
        controller.fetch_lazy("https://x/ok");
        assert_eq!(mock.calls().len(), 1);

        mock.resolve(0, Ok(titled("T")));
        controller.settled().await;

        // Same target again without a reload: nothing new
        controller.fetch_lazy("https://x/ok");
        assert_eq!(mock.calls().len(), 1);
        assert_eq!(controller.phase(), Phase::Success);

        controller.reload();
        assert_eq!(mock.calls(), vec!["https://x/ok", "https://x/ok"]);
        // Previous payload stays visible until the reload settles
        assert!(controller.is_loading());
        assert_eq!(controller.data(), Some(&titled("T")));
    }

    #[tokio::test]
    async fn test_superseded_request_never_mutates_state() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("A");
        controller.fetch_lazy("B");
        assert_eq!(mock.calls(), vec!["A", "B"]);

        // B settles first, then A's late answer arrives
        mock.resolve(1, Ok(titled("from B")));
        controller.settled().await;
        mock.resolve(0, Ok(titled("from A")));
        tokio::task::yield_now().await;

        assert_eq!(controller.poll(), None);
        assert_eq!(controller.data(), Some(&titled("from B")));
    }

    #[tokio::test]
    async fn test_stale_failure_is_not_counted() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("A");
        controller.fetch_lazy("B");
        mock.resolve(0, Err(failure()));
        mock.resolve(1, Ok(titled("from B")));

        assert_eq!(controller.settled().await, Some(Settlement::Succeeded));
        assert_eq!(controller.error_count(), 0);
        assert_eq!(controller.data(), Some(&titled("from B")));
    }

    #[tokio::test]
    async fn test_completion_with_old_id_is_discarded() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("A");
        controller.fetch_lazy("B");

        // Simulate A's completion arriving despite the abort
        let stale = Completion {
            id: 1,
            result: Ok(titled("from A")),
        };
        assert_eq!(controller.settle(stale), None);
        assert!(controller.is_loading());
        assert!(controller.data().is_none());

        let stale_failure = Completion {
            id: 1,
            result: Err(failure()),
        };
        assert_eq!(controller.settle(stale_failure), None);
        assert_eq!(controller.error_count(), 0);

        mock.resolve(1, Ok(titled("from B")));
        controller.settled().await;
        assert_eq!(controller.data(), Some(&titled("from B")));
    }

    #[tokio::test]
    async fn test_cancellation_is_not_a_failure() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("https://x/ok");
        mock.resolve(0, Err(FetchError::Cancelled));

        assert_eq!(controller.settled().await, Some(Settlement::Cancelled));
        assert_eq!(controller.phase(), Phase::Loading);
        assert_eq!(controller.error_count(), 0);

        // Recoverable by reloading
        controller.reload();
        mock.resolve(1, Ok(titled("T")));
        controller.settled().await;
        assert_eq!(controller.phase(), Phase::Success);
    }

    #[tokio::test]
    async fn test_poll_applies_finished_request() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("https://x/ok");
        assert_eq!(controller.poll(), None);
        assert!(controller.is_loading());

        mock.resolve(0, Ok(titled("T")));
        let mut settlement = None;
        for _ in 0..16 {
            tokio::task::yield_now().await;
            settlement = controller.poll();
            if settlement.is_some() {
                break;
            }
        }

        assert_eq!(settlement, Some(Settlement::Succeeded));
        assert_eq!(controller.data(), Some(&titled("T")));
    }

    #[tokio::test]
    async fn test_with_target_issues_on_construction() {
        let mock = MockFetcher::default();
        let controller = FetchController::with_target(mock.clone(), "https://x/ok");

        assert!(controller.is_loading());
        assert_eq!(controller.target(), Some("https://x/ok"));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_cancels_in_flight_request() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());
        controller.fetch_lazy("https://x/slow");

        let mut responder = mock.take(0);
        drop(controller);

        // The spawned request is aborted, which drops its receiving end
        let closed = tokio::time::timeout(Duration::from_secs(1), responder.closed()).await;
        assert!(closed.is_ok());
        assert!(responder.send(Ok(titled("late"))).is_err());
    }

    #[tokio::test]
    async fn test_superseding_aborts_previous_request() {
        let mock = MockFetcher::default();
        let mut controller = FetchController::new(mock.clone());

        controller.fetch_lazy("A");
        let mut first = mock.take(0);
        controller.fetch_lazy("B");

        let closed = tokio::time::timeout(Duration::from_secs(1), first.closed()).await;
        assert!(closed.is_ok());
        assert!(controller.is_loading());
    }
}
