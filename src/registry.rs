//! Registry of active monitors

use crate::errors::Result;
use crate::monitor::Monitor;
use crate::notification::NotificationSink;
use crate::prober::{Prober, TcpProber};
use crate::service::Service;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

/// Opaque handle to a running monitor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MonitorHandle {
    id: Uuid,
}

/// The set of monitors currently running.
///
/// Each started service gets its own independently scheduled task, keyed by
/// an opaque handle. Callers that need name-based lookup (modify or delete
/// workflows) keep their own mapping from name to handle.
pub struct MonitorSet {
    prober: Arc<dyn Prober>,
    active: Mutex<HashMap<Uuid, watch::Sender<bool>>>,
}

impl MonitorSet {
    pub fn new() -> Self {
        Self::with_prober(Arc::new(TcpProber))
    }

    /// Use a non-default prober; tests drive the set with scripted ones.
    pub fn with_prober(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            active: Mutex::new(HashMap::new()),
        }
    }

    /// Validate `service` and begin monitoring it, notifying `sink` on every
    /// availability transition.
    ///
    /// Fails with `MonitorError::InvalidService` before anything is
    /// scheduled if the service definition is malformed.
    pub fn start(
        &self,
        service: Service,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<MonitorHandle> {
        let monitor = Monitor::new(service, Arc::clone(&self.prober), sink)?;

        let id = Uuid::new_v4();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(monitor.run(shutdown_rx));
        self.active.lock().unwrap().insert(id, shutdown_tx);

        Ok(MonitorHandle { id })
    }

    /// Stop the monitor behind `handle`.
    ///
    /// Idempotent: stopping a handle that was already stopped is a no-op.
    /// Returns once the stop has been requested; an in-flight probe may
    /// still complete, but its result is discarded.
    pub fn stop(&self, handle: &MonitorHandle) {
        if let Some(shutdown) = self.active.lock().unwrap().remove(&handle.id) {
            let _ = shutdown.send(true);
            debug!(monitor = %handle.id, "Monitor stop requested");
        }
    }

    /// Stop every active monitor.
    ///
    /// Returns once cancellation has been requested for each monitor, not
    /// once every in-flight socket has closed; the probe timeout bounds how
    /// long any straggler can linger.
    pub fn stop_all(&self) {
        let drained: Vec<_> = self.active.lock().unwrap().drain().collect();
        let count = drained.len();

        for (_, shutdown) in drained {
            let _ = shutdown.send(true);
        }

        if count > 0 {
            info!("Requested stop for {} monitors", count);
        }
    }

    /// Number of active monitors.
    pub fn len(&self) -> usize {
        self.active.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MonitorSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MonitorSet {
    fn drop(&mut self) {
        // Dropping the shutdown senders stops the remaining monitor tasks
        self.active.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MonitorError;
    use crate::notification::{ChannelSink, EventKind};
    use crate::prober::ProbeOutcome;
    use crate::service::PollUnit;
    use async_trait::async_trait;
    use tokio_test::assert_ok;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Prober that always answers the same and counts its calls
    struct FixedProber {
        outcome: ProbeOutcome,
        calls: AtomicUsize,
    }

    impl FixedProber {
        fn new(outcome: ProbeOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Prober for FixedProber {
        async fn probe(&self, _host: &str, _port: u16, _limit: Duration) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome
        }
    }

    fn fast_service(name: &str) -> Service {
        Service::new(name, "127.0.0.1:9999", 10, PollUnit::Milliseconds)
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_service() {
        let set = MonitorSet::new();
        let (sink, _rx) = ChannelSink::new();

        let result = set.start(
            Service::new("api", "badhost", 1, PollUnit::Seconds),
            Arc::new(sink),
        );

        assert!(matches!(result, Err(MonitorError::InvalidService(_))));
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_start_and_stop_single_monitor() {
        let set = MonitorSet::with_prober(Arc::new(FixedProber::new(ProbeOutcome::Unreachable)));
        let (sink, mut rx) = ChannelSink::new();

        let handle = tokio_test::assert_ok!(set.start(fast_service("api"), Arc::new(sink)));
        assert_eq!(set.len(), 1);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::BecameUnavailable);
        assert_eq!(event.service.name, "api");

        set.stop(&handle);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let set = MonitorSet::with_prober(Arc::new(FixedProber::new(ProbeOutcome::Reachable)));
        let (sink, _rx) = ChannelSink::new();

        let handle = set.start(fast_service("api"), Arc::new(sink)).unwrap();
        set.stop(&handle);
        set.stop(&handle);
        set.stop(&handle);

        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_no_events_after_stop() {
        let set = MonitorSet::with_prober(Arc::new(FixedProber::new(ProbeOutcome::Unreachable)));
        let (sink, mut rx) = ChannelSink::new();

        let handle = set.start(fast_service("api"), Arc::new(sink)).unwrap();

        // Wait for the one debounced event, then stop
        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::BecameUnavailable);
        set.stop(&handle);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stop_all_clears_every_monitor() {
        let set = MonitorSet::with_prober(Arc::new(FixedProber::new(ProbeOutcome::Reachable)));
        let (sink, _rx) = ChannelSink::new();
        let sink: Arc<dyn NotificationSink> = Arc::new(sink);

        for i in 0..4 {
            set.start(fast_service(&format!("svc-{}", i)), Arc::clone(&sink))
                .unwrap();
        }
        assert_eq!(set.len(), 4);

        set.stop_all();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_monitors_tick_independently() {
        let fast = Arc::new(FixedProber::new(ProbeOutcome::Reachable));
        let set = MonitorSet::with_prober(Arc::clone(&fast) as Arc<dyn Prober>);
        let (sink, _rx) = ChannelSink::new();
        let sink: Arc<dyn NotificationSink> = Arc::new(sink);

        // One quick service next to one with a much longer period
        set.start(
            Service::new("quick", "127.0.0.1:9999", 10, PollUnit::Milliseconds),
            Arc::clone(&sink),
        )
        .unwrap();
        set.start(
            Service::new("slow", "127.0.0.1:9998", 5, PollUnit::Seconds),
            Arc::clone(&sink),
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        set.stop_all();

        // quick ticks many times in the window, slow only its immediate
        // first tick; together well above two calls proves quick was never
        // held back by slow's schedule
        let calls = fast.calls.load(Ordering::SeqCst);
        assert!(calls >= 5, "expected at least 5 probe calls, saw {}", calls);
    }
}
