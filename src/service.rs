//! Service definitions for monitored endpoints

use crate::errors::{MonitorError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time unit for the polling interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollUnit {
    Milliseconds,
    Seconds,
    Minutes,
}

/// A network service to monitor for reachability.
///
/// Immutable once a monitor is running against it; modifying a service means
/// stopping the old monitor and starting a new one with the replacement value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Display identifier for the service
    pub name: String,

    /// Endpoint to probe, as `host:port`
    pub address: String,

    /// How often to probe, in units of `poll_unit`
    pub poll_interval: u64,

    /// Time unit for `poll_interval`
    pub poll_unit: PollUnit,
}

impl Service {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        poll_interval: u64,
        poll_unit: PollUnit,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            poll_interval,
            poll_unit,
        }
    }

    /// Validate the service definition.
    ///
    /// Runs before any monitor is scheduled, so a monitor never starts
    /// against a service that cannot be probed. Host resolution is deferred
    /// to probe time; an unresolvable host shows up as an unreachable
    /// service, not a start-time error.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(MonitorError::InvalidService(
                "service name cannot be empty".to_string(),
            ));
        }

        self.host_port()?;

        if self.poll_interval == 0 {
            return Err(MonitorError::InvalidService(format!(
                "poll_interval for '{}' must be a positive integer",
                self.name
            )));
        }

        Ok(())
    }

    /// Split `address` into its host and port parts.
    pub fn host_port(&self) -> Result<(&str, u16)> {
        let mut parts = self.address.split(':');

        let (host, port) = match (parts.next(), parts.next(), parts.next()) {
            (Some(host), Some(port), None) => (host, port),
            _ => {
                return Err(MonitorError::InvalidService(format!(
                    "address '{}' must be of the form host:port",
                    self.address
                )));
            }
        };

        if host.is_empty() {
            return Err(MonitorError::InvalidService(format!(
                "address '{}' has an empty host",
                self.address
            )));
        }

        let port: u16 = port.parse().map_err(|_| {
            MonitorError::InvalidService(format!(
                "address '{}' has a non-numeric or out-of-range port",
                self.address
            ))
        })?;

        if port == 0 {
            return Err(MonitorError::InvalidService(format!(
                "address '{}' has port 0, which is not a valid TCP port",
                self.address
            )));
        }

        Ok((host, port))
    }

    /// The polling period as a `Duration`.
    pub fn poll_period(&self) -> Duration {
        match self.poll_unit {
            PollUnit::Milliseconds => Duration::from_millis(self.poll_interval),
            PollUnit::Seconds => Duration::from_secs(self.poll_interval),
            PollUnit::Minutes => Duration::from_secs(self.poll_interval * 60),
        }
    }
}
