//! Notification contract and built-in sinks

use crate::service::Service;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Kind of availability transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    BecameUnavailable,
    BecameAvailable,
}

/// A single availability transition, handed to consumers as it happens.
///
/// The core keeps no history; whoever receives these owns any record of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub service: Service,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

/// Receiver of availability transitions for a monitored service.
///
/// Called synchronously from the monitor's scheduled execution, so
/// implementations must not block significantly; slow work (UI rendering,
/// network delivery) belongs behind a channel or spawned task.
pub trait NotificationSink: Send + Sync {
    fn service_unavailable(&self, service: &Service);
    fn service_available(&self, service: &Service);
}

/// Sink that reports transitions as structured log events.
#[derive(Debug, Clone, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn service_unavailable(&self, service: &Service) {
        warn!(
            service = %service.name,
            address = %service.address,
            "Service is not reachable"
        );
    }

    fn service_available(&self, service: &Service) {
        info!(
            service = %service.name,
            address = %service.address,
            "Service is now available"
        );
    }
}

/// Sink that forwards timestamped events over an unbounded channel.
///
/// Send never blocks; if the receiving side has gone away the event is
/// silently dropped, which is harmless since a closed receiver means nobody
/// is listening anymore.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<StatusEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, service: &Service, kind: EventKind) {
        let _ = self.sender.send(StatusEvent {
            service: service.clone(),
            kind,
            timestamp: Utc::now(),
        });
    }
}

impl NotificationSink for ChannelSink {
    fn service_unavailable(&self, service: &Service) {
        self.send(service, EventKind::BecameUnavailable);
    }

    fn service_available(&self, service: &Service) {
        self.send(service, EventKind::BecameAvailable);
    }
}
