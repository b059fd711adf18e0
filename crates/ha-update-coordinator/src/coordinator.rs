//! DataUpdateCoordinator

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::debounce::{Admission, Debouncer};
use crate::error::{ConfigEntryNotReady, UpdateFailed};

/// Cooldown between refreshes triggered through `async_request_refresh`
pub const REQUEST_REFRESH_DEFAULT_COOLDOWN: Duration = Duration::from_secs(10);

/// Fetches one full snapshot from the remote side
#[async_trait]
pub trait UpdateMethod<T>: Send + Sync {
    async fn async_update_data(&self) -> Result<T, UpdateFailed>;
}

/// Polls an [`UpdateMethod`] and holds the latest snapshot
///
/// The snapshot is swapped atomically: readers get either the old or the
/// new `Arc<T>` in full. A failed refresh keeps the previous snapshot and
/// only flips [`last_update_success`](Self::last_update_success).
pub struct DataUpdateCoordinator<T> {
    name: String,
    update_interval: Option<Duration>,
    update_method: Box<dyn UpdateMethod<T>>,
    /// Latest snapshot; subscribers are notified after every refresh attempt
    data: watch::Sender<Option<Arc<T>>>,
    last_update_success: AtomicBool,
    /// Serializes fetches so two refreshes never race on the swap
    refresh_lock: Mutex<()>,
    debouncer: Debouncer,
    cancel: CancellationToken,
}

impl<T: Send + Sync + 'static> DataUpdateCoordinator<T> {
    pub fn new(name: impl Into<String>, update_method: impl UpdateMethod<T> + 'static) -> Self {
        let (data, _) = watch::channel(None);
        Self {
            name: name.into(),
            update_interval: None,
            update_method: Box::new(update_method),
            data,
            last_update_success: AtomicBool::new(true),
            refresh_lock: Mutex::new(()),
            debouncer: Debouncer::new(REQUEST_REFRESH_DEFAULT_COOLDOWN),
            cancel: CancellationToken::new(),
        }
    }

    /// Poll every `interval`; without one the coordinator only refreshes on request
    pub fn with_update_interval(mut self, interval: Duration) -> Self {
        self.update_interval = Some(interval);
        self
    }

    /// Override the refresh-request cooldown; zero disables debouncing
    pub fn with_request_refresh_cooldown(mut self, cooldown: Duration) -> Self {
        self.debouncer = Debouncer::new(cooldown);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn update_interval(&self) -> Option<Duration> {
        self.update_interval
    }

    /// Current snapshot, `None` until the first successful refresh
    pub fn data(&self) -> Option<Arc<T>> {
        self.data.borrow().clone()
    }

    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::SeqCst)
    }

    /// Receiver notified after every refresh attempt, successful or not
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.data.subscribe()
    }

    /// Fetch now and swap in the new snapshot
    pub async fn async_refresh(&self) {
        // Failures are already logged and reflected in last_update_success
        let _ = self.refresh().await;
    }

    #[instrument(skip(self), fields(coordinator = %self.name))]
    async fn refresh(&self) -> Result<(), UpdateFailed> {
        let _guard = self.refresh_lock.lock().await;
        let start = Instant::now();

        let result = self.update_method.async_update_data().await;
        match &result {
            Ok(_) => {
                if !self.last_update_success.swap(true, Ordering::SeqCst) {
                    info!("Fetching {} data recovered", self.name);
                }
            }
            Err(err) => {
                // Log loudly once per outage
                if self.last_update_success.swap(false, Ordering::SeqCst) {
                    error!("Error fetching {} data: {}", self.name, err);
                } else {
                    debug!("Error fetching {} data: {}", self.name, err);
                }
            }
        }

        let outcome = match result {
            Ok(data) => {
                self.data.send_replace(Some(Arc::new(data)));
                Ok(())
            }
            Err(err) => {
                self.data.send_modify(|_| {});
                Err(err)
            }
        };

        debug!(
            "Finished fetching {} data in {:.3} seconds (success: {})",
            self.name,
            start.elapsed().as_secs_f64(),
            outcome.is_ok()
        );
        outcome
    }

    /// Ask for a refresh, debounced
    ///
    /// The first request in a cooldown window refreshes immediately; any
    /// further requests inside the window collapse into one refresh when
    /// the window closes.
    pub async fn async_request_refresh(self: &Arc<Self>) {
        match self.debouncer.admit().await {
            Admission::Now => self.async_refresh().await,
            Admission::Deferred(at) => {
                debug!("Scheduling trailing {} refresh", self.name);
                let coordinator = Arc::clone(self);
                tokio::spawn(async move {
                    tokio::select! {
                        biased;
                        () = coordinator.cancel.cancelled() => {}
                        () = tokio::time::sleep_until(at) => {
                            coordinator.debouncer.start_trailing().await;
                            coordinator.async_refresh().await;
                        }
                    }
                });
            }
            Admission::Coalesced => {
                debug!("Refresh of {} already scheduled", self.name);
            }
        }
    }

    /// First refresh during config entry setup
    ///
    /// Returns [`ConfigEntryNotReady`] when it fails, so the entry can be
    /// retried instead of being loaded without data.
    pub async fn async_config_entry_first_refresh(&self) -> Result<(), ConfigEntryNotReady> {
        self.refresh().await.map_err(|source| ConfigEntryNotReady {
            name: self.name.clone(),
            source,
        })
    }

    /// Spawn the polling task; `None` when no update interval is configured
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let period = self.update_interval?;
        let coordinator = Arc::clone(self);

        info!(
            "Polling {} every {} seconds",
            self.name,
            period.as_secs_f64()
        );

        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = coordinator.cancel.cancelled() => break,
                    _ = interval.tick() => coordinator.async_refresh().await,
                }
            }
            debug!("Stopped polling {}", coordinator.name);
        }))
    }

    /// Stop polling and drop any scheduled trailing refresh
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Returns a counter value, failing while `fail` is set
    struct Counter {
        calls: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
    }

    #[async_trait]
    impl UpdateMethod<usize> for Counter {
        async fn async_update_data(&self) -> Result<usize, UpdateFailed> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail.load(Ordering::SeqCst) {
                return Err(UpdateFailed::new("device offline"));
            }
            Ok(n)
        }
    }

    fn counter() -> (Counter, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let fail = Arc::new(AtomicBool::new(false));
        (
            Counter {
                calls: calls.clone(),
                fail: fail.clone(),
            },
            calls,
            fail,
        )
    }

    #[tokio::test]
    async fn test_refresh_swaps_snapshot() {
        let (method, _, _) = counter();
        let coordinator = DataUpdateCoordinator::new("test", method);
        assert!(coordinator.data().is_none());

        coordinator.async_refresh().await;
        let first = coordinator.data().unwrap();
        coordinator.async_refresh().await;

        assert_eq!(*first, 1);
        assert_eq!(*coordinator.data().unwrap(), 2);
        assert!(coordinator.last_update_success());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let (method, _, fail) = counter();
        let coordinator = DataUpdateCoordinator::new("test", method);
        coordinator.async_refresh().await;

        fail.store(true, Ordering::SeqCst);
        coordinator.async_refresh().await;
        assert!(!coordinator.last_update_success());
        assert_eq!(*coordinator.data().unwrap(), 1);

        fail.store(false, Ordering::SeqCst);
        coordinator.async_refresh().await;
        assert!(coordinator.last_update_success());
        assert_eq!(*coordinator.data().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_notified_on_failure() {
        let (method, _, fail) = counter();
        let coordinator = DataUpdateCoordinator::new("test", method);
        let mut rx = coordinator.subscribe();

        fail.store(true, Ordering::SeqCst);
        coordinator.async_refresh().await;

        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_first_refresh_not_ready() {
        let (method, _, fail) = counter();
        fail.store(true, Ordering::SeqCst);
        let coordinator = DataUpdateCoordinator::new("plugwise", method);

        let err = coordinator
            .async_config_entry_first_refresh()
            .await
            .unwrap_err();
        assert_eq!(err.name, "plugwise");
        assert_eq!(err.source, UpdateFailed::new("device offline"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_refresh_debounced() {
        let (method, calls, _) = counter();
        let coordinator = Arc::new(
            DataUpdateCoordinator::new("test", method)
                .with_request_refresh_cooldown(Duration::from_secs(10)),
        );

        coordinator.async_request_refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        coordinator.async_request_refresh().await;
        coordinator.async_request_refresh().await;
        coordinator.async_request_refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(*coordinator.data().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_request_refresh_without_cooldown() {
        let (method, calls, _) = counter();
        let coordinator = Arc::new(
            DataUpdateCoordinator::new("test", method)
                .with_request_refresh_cooldown(Duration::ZERO),
        );

        coordinator.async_request_refresh().await;
        coordinator.async_request_refresh().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_and_shutdown() {
        let (method, calls, _) = counter();
        let coordinator = Arc::new(
            DataUpdateCoordinator::new("test", method).with_update_interval(Duration::from_secs(60)),
        );

        let handle = coordinator.start().unwrap();
        tokio::time::sleep(Duration::from_secs(125)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        coordinator.shutdown();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_interval_no_polling() {
        let (method, _, _) = counter();
        let coordinator = Arc::new(DataUpdateCoordinator::new("test", method));
        assert!(coordinator.start().is_none());
    }
}
