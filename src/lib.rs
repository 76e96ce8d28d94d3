//! Service Watch Library
//!
//! This library provides components for watching network services via
//! periodic TCP reachability probes and notifying a sink when a service
//! transitions between available and unavailable.

pub mod config;
pub mod errors;
pub mod monitor;
pub mod notification;
pub mod prober;
pub mod registry;
pub mod service;

pub use config::Config;
pub use errors::{MonitorError, Result};
pub use monitor::Availability;
pub use notification::{ChannelSink, EventKind, LogSink, NotificationSink, StatusEvent};
pub use prober::{PROBE_TIMEOUT, ProbeOutcome, Prober, TcpProber};
pub use registry::{MonitorHandle, MonitorSet};
pub use service::{PollUnit, Service};
