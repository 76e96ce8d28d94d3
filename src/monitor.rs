//! Per-service availability monitor

use crate::errors::Result;
use crate::notification::NotificationSink;
use crate::prober::{PROBE_TIMEOUT, ProbeOutcome, Prober};
use crate::service::Service;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

/// Availability state of a monitored service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable,
}

/// The scheduling and state-machine unit for one service.
///
/// A monitor assumes its service is available at start, probes it on a fixed
/// period, and notifies the sink exactly once per state change: repeated
/// failures after the first are debounced into silence until the service
/// recovers, and repeated successes are equally quiet.
///
/// The state is owned by the monitor's own task and only ever touched between
/// one probe and the next, so it needs no locking.
pub(crate) struct Monitor {
    service: Service,
    host: String,
    port: u16,
    prober: Arc<dyn Prober>,
    sink: Arc<dyn NotificationSink>,
    state: Availability,
}

impl Monitor {
    /// Build a monitor for `service`, validating it first.
    pub(crate) fn new(
        service: Service,
        prober: Arc<dyn Prober>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        service.validate()?;
        let (host, port) = service.host_port()?;
        let host = host.to_string();

        Ok(Self {
            service,
            host,
            port,
            prober,
            sink,
            state: Availability::Available,
        })
    }

    /// Run the probe loop until `shutdown` is signalled.
    ///
    /// The first tick fires immediately. Ticks are serialized: the next one
    /// is not polled until the previous probe and transition have completed,
    /// and a probe slower than the period delays the schedule rather than
    /// bursting to catch up.
    pub(crate) async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.service.poll_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            service = %self.service.name,
            address = %self.service.address,
            period = ?self.service.poll_period(),
            "Starting monitor"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            let outcome = self.prober.probe(&self.host, self.port, PROBE_TIMEOUT).await;

            // A stop requested while the probe was in flight means its
            // result must be discarded, not turned into an event.
            if *shutdown.borrow() {
                break;
            }

            self.observe(outcome);
        }

        debug!(service = %self.service.name, "Monitor stopped");
    }

    /// Apply one probe outcome to the state machine, notifying on the edge.
    fn observe(&mut self, outcome: ProbeOutcome) {
        match (self.state, outcome) {
            (Availability::Available, ProbeOutcome::Unreachable) => {
                self.state = Availability::Unavailable;
                self.sink.service_unavailable(&self.service);
            }
            (Availability::Unavailable, ProbeOutcome::Reachable) => {
                self.state = Availability::Available;
                self.sink.service_available(&self.service);
            }
            // Same state as before: debounced, no notification
            (Availability::Available, ProbeOutcome::Reachable)
            | (Availability::Unavailable, ProbeOutcome::Unreachable) => {}
        }
    }
}
