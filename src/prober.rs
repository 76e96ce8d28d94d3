//! TCP reachability probing

use async_trait::async_trait;
use std::time::Duration;
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use tracing::debug;

/// Fixed connect timeout for a single probe
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Outcome of a single reachability probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable,
}

/// A single-shot reachability check against a host and port.
///
/// Implementations perform exactly one connection attempt per call; retry
/// cadence belongs to the monitor's schedule, not the prober.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, host: &str, port: u16, limit: Duration) -> ProbeOutcome;
}

/// Production prober: one TCP connect bounded by the timeout.
///
/// Host resolution failures, connect timeouts, and connection refusals all
/// collapse to `Unreachable`; the distinction is not surfaced to callers.
#[derive(Debug, Clone, Default)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, port: u16, limit: Duration) -> ProbeOutcome {
        let addr = match lookup_host((host, port)).await {
            Ok(mut addrs) => match addrs.next() {
                Some(addr) => addr,
                None => {
                    debug!("No addresses resolved for {}:{}", host, port);
                    return ProbeOutcome::Unreachable;
                }
            },
            Err(e) => {
                debug!("Host resolution failed for {}:{}: {}", host, port, e);
                return ProbeOutcome::Unreachable;
            }
        };

        match timeout(limit, TcpStream::connect(addr)).await {
            // Dropping the stream closes the socket immediately; a probe
            // only establishes the connection, it never speaks on it.
            Ok(Ok(_stream)) => ProbeOutcome::Reachable,
            Ok(Err(e)) => {
                debug!("Connect to {}:{} failed: {}", host, port, e);
                ProbeOutcome::Unreachable
            }
            Err(_) => {
                debug!("Connect to {}:{} timed out after {:?}", host, port, limit);
                ProbeOutcome::Unreachable
            }
        }
    }
}
