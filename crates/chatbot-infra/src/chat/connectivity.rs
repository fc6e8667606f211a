//! Connectivity oracles.
//!
//! `TcpProbeOracle` answers by opening (and immediately dropping) a TCP
//! connection to a known host. `ManualOracle` answers with whatever it was
//! last told; it backs the `--offline` flag.

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, mpsc};
use std::time::Duration;

use chatbot_core::chat::client::ConnectivityOracle;
use chatbot_types::config::ConnectivityConfig;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

/// Probes reachability with a bounded TCP connect.
///
/// The probe host is looked up at most once per successful resolution; a
/// lookup that does not finish within the timeout counts as offline. A check
/// therefore takes at most one timeout for the lookup plus one per resolved
/// address. Called from a multi-threaded tokio runtime, the blocking work is
/// moved off the async worker with `block_in_place`.
#[derive(Debug, Clone)]
pub struct TcpProbeOracle {
    addr: String,
    timeout: Duration,
    resolved: Arc<OnceLock<Vec<SocketAddr>>>,
}

impl TcpProbeOracle {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        let addr = addr.into();
        // Literal addresses need no lookup at all.
        let resolved = OnceLock::new();
        if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
            let _ = resolved.set(vec![socket_addr]);
        }
        Self {
            addr,
            timeout,
            resolved: Arc::new(resolved),
        }
    }

    pub fn from_config(config: &ConnectivityConfig) -> Self {
        Self::new(
            config.probe_addr.clone(),
            Duration::from_millis(config.timeout_ms),
        )
    }

    fn resolve(&self) -> Option<Vec<SocketAddr>> {
        if let Some(addrs) = self.resolved.get() {
            return Some(addrs.clone());
        }

        let addr = self.addr.clone();
        let lookup = run_with_deadline(self.timeout, move || addr.to_socket_addrs());
        match lookup {
            Some(Ok(addrs)) => {
                let addrs: Vec<SocketAddr> = addrs.collect();
                if addrs.is_empty() {
                    return None;
                }
                Some(self.resolved.get_or_init(|| addrs).clone())
            }
            Some(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "Probe address did not resolve");
                None
            }
            None => {
                debug!(addr = %self.addr, "Probe address lookup timed out");
                None
            }
        }
    }

    fn probe(&self) -> bool {
        self.resolve().is_some_and(|addrs| {
            addrs
                .iter()
                .any(|addr| TcpStream::connect_timeout(addr, self.timeout).is_ok())
        })
    }
}

impl ConnectivityOracle for TcpProbeOracle {
    fn is_online(&self) -> bool {
        let online = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(|| self.probe())
            }
            _ => self.probe(),
        };
        debug!(addr = %self.addr, online, "Connectivity probe");
        online
    }
}

/// Run `f` on a helper thread, giving up on its result after `timeout`.
///
/// The system resolver cannot be cancelled, so a lookup that overruns keeps
/// its thread until it returns on its own; only the caller stops waiting.
fn run_with_deadline<T, F>(timeout: Duration, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("chatbot-probe-lookup".to_string())
        .spawn(move || {
            let _ = tx.send(f());
        })
        .ok()?;
    rx.recv_timeout(timeout).ok()
}

/// Reachability set by hand.
#[derive(Debug)]
pub struct ManualOracle {
    online: AtomicBool,
}

impl ManualOracle {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl ConnectivityOracle for ManualOracle {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

/// Either oracle, chosen at startup.
#[derive(Debug)]
pub enum Connectivity {
    Probe(TcpProbeOracle),
    Manual(ManualOracle),
}

impl ConnectivityOracle for Connectivity {
    fn is_online(&self) -> bool {
        match self {
            Connectivity::Probe(oracle) => oracle.is_online(),
            Connectivity::Manual(oracle) => oracle.is_online(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::time::Instant;

    #[test]
    fn test_probe_online_when_listener_accepts() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let oracle = TcpProbeOracle::new(addr.to_string(), Duration::from_millis(500));
        assert!(oracle.is_online());
    }

    #[test]
    fn test_probe_offline_when_nothing_listens() {
        // Bind then drop to get a port that is very likely closed.
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let oracle = TcpProbeOracle::new(addr.to_string(), Duration::from_millis(200));
        assert!(!oracle.is_online());
    }

    #[test]
    fn test_probe_offline_when_address_does_not_resolve() {
        let oracle = TcpProbeOracle::new("not a valid address", Duration::from_millis(200));
        assert!(!oracle.is_online());
    }

    #[test]
    fn test_literal_address_needs_no_lookup() {
        let oracle = TcpProbeOracle::new("127.0.0.1:9", Duration::from_millis(100));
        assert_eq!(
            oracle.resolved.get(),
            Some(&vec!["127.0.0.1:9".parse::<SocketAddr>().unwrap()])
        );
        let named = TcpProbeOracle::new("localhost:9", Duration::from_millis(100));
        assert!(named.resolved.get().is_none());
    }

    #[test]
    fn test_resolved_addresses_are_cached() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let oracle = TcpProbeOracle::new(format!("localhost:{port}"), Duration::from_secs(2));
        assert!(oracle.resolve().is_some());
        assert!(oracle.resolved.get().is_some());
    }

    #[test]
    fn test_slow_work_is_cut_off_at_deadline() {
        let started = Instant::now();
        let result = run_with_deadline(Duration::from_millis(50), || {
            std::thread::sleep(Duration::from_secs(2));
            1
        });

        assert_eq!(result, None);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(run_with_deadline(Duration::from_secs(1), || 7), Some(7));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_probe_inside_multi_thread_runtime() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let oracle = TcpProbeOracle::new(
            listener.local_addr().unwrap().to_string(),
            Duration::from_millis(500),
        );
        assert!(oracle.is_online());
    }

    #[tokio::test]
    async fn test_probe_inside_current_thread_runtime() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let oracle = TcpProbeOracle::new(
            listener.local_addr().unwrap().to_string(),
            Duration::from_millis(500),
        );
        assert!(oracle.is_online());
    }

    #[test]
    fn test_probe_from_config() {
        let oracle = TcpProbeOracle::from_config(&ConnectivityConfig {
            probe_addr: "127.0.0.1:1".to_string(),
            timeout_ms: 250,
        });
        assert_eq!(oracle.timeout, Duration::from_millis(250));
        assert_eq!(oracle.addr, "127.0.0.1:1");
    }

    #[test]
    fn test_manual_oracle_toggles() {
        let oracle = ManualOracle::new(false);
        assert!(!oracle.is_online());
        oracle.set_online(true);
        assert!(oracle.is_online());
    }

    #[test]
    fn test_connectivity_dispatch() {
        let manual = Connectivity::Manual(ManualOracle::new(false));
        assert!(!manual.is_online());

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let probe = Connectivity::Probe(TcpProbeOracle::new(
            listener.local_addr().unwrap().to_string(),
            Duration::from_millis(500),
        ));
        assert!(probe.is_online());
    }
}
