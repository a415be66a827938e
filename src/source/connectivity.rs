//! Network availability.
//!
//! The load controller asks a [`Connectivity`] before every load, on the UI
//! thread, so answering must be a cheap read.  The production implementation,
//! [`ReachabilityMonitor`], keeps a flag that a background thread refreshes by
//! opening a TCP connection to the search endpoint's host.

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use tracing::{debug, info, warn};
use url::Url;

/// Budget for one reachability check, shared by every resolved address.
const CHECK_TIMEOUT: Duration = Duration::from_millis(1_500);

/// Pause between reachability checks.
const REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// "Is a network currently usable?"
///
/// Implementations must answer without blocking.
pub trait Connectivity: Send {
    fn is_available(&self) -> bool;
}

/// Closures work too, which keeps tests short.
impl<F> Connectivity for F
where
    F: Fn() -> bool + Send,
{
    fn is_available(&self) -> bool {
        self()
    }
}

/// Tracks whether one host/port accepts TCP connections.
///
/// Reports available until the first check says otherwise.  The background
/// thread exits once the monitor is dropped.
#[derive(Debug, Clone)]
pub struct ReachabilityMonitor {
    online: Arc<AtomicBool>,
}

impl ReachabilityMonitor {
    pub fn spawn(host: impl Into<String>, port: u16) -> Self {
        Self::spawn_with_interval(host.into(), port, REFRESH_INTERVAL)
    }

    /// Watch the host serving `endpoint`.
    pub fn for_endpoint(endpoint: &str) -> Result<Self> {
        let (host, port) = endpoint_target(endpoint)?;
        Ok(Self::spawn(host, port))
    }

    fn spawn_with_interval(host: String, port: u16, interval: Duration) -> Self {
        let online = Arc::new(AtomicBool::new(true));
        let weak = Arc::downgrade(&online);
        let spawned = thread::Builder::new()
            .name("reachability".into())
            .spawn(move || watch(&weak, &host, port, interval));
        if let Err(e) = spawned {
            warn!(error = %e, "could not start reachability thread, assuming online");
        }
        Self { online }
    }
}

impl Connectivity for ReachabilityMonitor {
    fn is_available(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

fn watch(online: &Weak<AtomicBool>, host: &str, port: u16, interval: Duration) {
    loop {
        let reachable = check_reachable(host, port, CHECK_TIMEOUT);
        let Some(flag) = online.upgrade() else {
            debug!(host, "monitor dropped, stopping reachability checks");
            return;
        };
        if flag.swap(reachable, Ordering::SeqCst) != reachable {
            info!(host, port, reachable, "network reachability changed");
        }
        drop(flag);
        thread::sleep(interval);
    }
}

/// Try each resolved address until one connects or `budget` runs out.
fn check_reachable(host: &str, port: u16, budget: Duration) -> bool {
    let deadline = Instant::now() + budget;
    let addrs = match (host, port).to_socket_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            debug!(host, error = %e, "could not resolve host");
            return false;
        }
    };

    for addr in addrs {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        if TcpStream::connect_timeout(&addr, left).is_ok() {
            return true;
        }
    }
    false
}

/// Host and port (explicit or the scheme's default) of `endpoint`.
fn endpoint_target(endpoint: &str) -> Result<(String, u16)> {
    let url = Url::parse(endpoint)?;
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("endpoint {endpoint} has no host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| anyhow!("endpoint {endpoint} has no known port"))?;
    Ok((host.to_string(), port))
}
