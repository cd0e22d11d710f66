//! Network reachability, consulted once at request start

use std::net::{TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use netbound_config::NetworkConfig;
use tracing::debug;

pub trait NetworkProbe: Send + Sync {
    fn is_connected(&self) -> bool;
}

/// Probe with a fixed answer that can be flipped at runtime.
#[derive(Debug)]
pub struct StaticNetworkProbe {
    connected: AtomicBool,
}

impl StaticNetworkProbe {
    #[must_use]
    pub fn new(connected: bool) -> Self {
        Self {
            connected: AtomicBool::new(connected),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

impl NetworkProbe for StaticNetworkProbe {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// Probe that opens (and drops) a TCP connection to `host:port`.
///
/// Blocks for at most the connect timeout per resolved address.
#[derive(Debug, Clone)]
pub struct TcpNetworkProbe {
    addr: String,
    timeout: Duration,
}

impl TcpNetworkProbe {
    #[must_use]
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }

    /// Probe configured by `[network] probe_addr`, if one is set.
    #[must_use]
    pub fn from_config(network: &NetworkConfig) -> Option<Self> {
        network
            .probe_addr
            .as_ref()
            .map(|addr| Self::new(addr.clone(), network.probe_timeout()))
    }
}

impl NetworkProbe for TcpNetworkProbe {
    fn is_connected(&self) -> bool {
        let addrs = match self.addr.to_socket_addrs() {
            Ok(addrs) => addrs,
            Err(e) => {
                debug!(addr = %self.addr, error = %e, "Probe address did not resolve");
                return false;
            }
        };
        let connected = addrs
            .into_iter()
            .any(|addr| TcpStream::connect_timeout(&addr, self.timeout).is_ok());
        debug!(addr = %self.addr, connected, "Network probe finished");
        connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_static_probe_can_flip() {
        let probe = StaticNetworkProbe::new(true);
        assert!(probe.is_connected());
        probe.set_connected(false);
        assert!(!probe.is_connected());
    }

    #[test]
    fn test_tcp_probe_against_local_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let probe = TcpNetworkProbe::new(addr.to_string(), Duration::from_millis(500));
        assert!(probe.is_connected());

        drop(listener);
        assert!(!probe.is_connected());
    }

    #[test]
    fn test_unresolvable_address_is_offline() {
        let probe = TcpNetworkProbe::new("not-an-address", Duration::from_millis(100));
        assert!(!probe.is_connected());
    }

    #[test]
    fn test_from_config_requires_addr() {
        assert!(TcpNetworkProbe::from_config(&NetworkConfig::default()).is_none());
        let network = NetworkConfig {
            probe_addr: Some("localhost:80".to_string()),
            ..NetworkConfig::default()
        };
        assert!(TcpNetworkProbe::from_config(&network).is_some());
    }
}
