use std::time::Duration;

use netbound_config::{Config, DEFAULT_NETWORK_TIMEOUT_MS, DEFAULT_STARTUP_DELAY_MS};

/// Timing applied to one orchestrated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceConfig {
    /// Watchdog budget, measured from request start
    pub timeout: Duration,
    /// Delay before the remote call is issued
    pub startup_delay: Duration,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_NETWORK_TIMEOUT_MS),
            startup_delay: Duration::from_millis(DEFAULT_STARTUP_DELAY_MS),
        }
    }
}

impl ResourceConfig {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            timeout: config.network.timeout(),
            startup_delay: config.network.startup_delay(),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }
}
