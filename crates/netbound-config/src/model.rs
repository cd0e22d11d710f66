use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default watchdog budget for one network round-trip
pub const DEFAULT_NETWORK_TIMEOUT_MS: u64 = 3_000;

/// Default delay before the remote call is issued (test instrumentation only)
pub const DEFAULT_STARTUP_DELAY_MS: u64 = 0;

/// Default connect timeout for the TCP reachability probe
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1_500;

/// Default per-request HTTP timeout; the watchdog normally fires first
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default API root; endpoints are resolved relative to it
pub const DEFAULT_BASE_URL: &str = "https://open-api.xyz/api/";

/// Where a configuration value came from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    /// Built-in defaults only
    #[default]
    Defaults,
    /// Loaded from a TOML file
    File(PathBuf),
    /// Assembled through [`ConfigBuilder`](crate::ConfigBuilder)
    Programmatic,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => write!(f, "defaults"),
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// `[network]` table: request timing and reachability probing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    /// Watchdog budget in milliseconds
    pub timeout_ms: u64,
    /// Delay before issuing the remote call, in milliseconds
    pub startup_delay_ms: u64,
    /// `host:port` probed with a TCP connect; absent means "assume online"
    pub probe_addr: Option<String>,
    /// Connect timeout for the probe, in milliseconds
    pub probe_timeout_ms: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_NETWORK_TIMEOUT_MS,
            startup_delay_ms: DEFAULT_STARTUP_DELAY_MS,
            probe_addr: None,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// `[api]` table: remote endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// `[storage]` table: where the local database and settings live
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

/// Configuration for netbound.
///
/// Precedence: explicit file > `NETBOUND_CONFIG` > platform config directory >
/// built-in defaults. Every table is optional.
///
/// ```toml
/// [network]
/// timeout_ms = 3000
/// startup_delay_ms = 0
/// probe_addr = "open-api.xyz:443"
///
/// [api]
/// base_url = "https://open-api.xyz/api/"
///
/// [storage]
/// data_dir = "/var/lib/netbound"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub network: NetworkConfig,
    pub api: ApiConfig,
    pub storage: StorageConfig,
    #[serde(skip)]
    pub source: ConfigSource,
}

impl Config {
    /// Directory holding the local database and settings file.
    ///
    /// Falls back to `<platform data dir>/netbound`, then `./.netbound`.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join("netbound")))
            .unwrap_or_else(|| PathBuf::from(".netbound"))
    }
}
