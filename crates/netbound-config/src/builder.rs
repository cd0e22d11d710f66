use std::path::PathBuf;
use std::time::Duration;

use netbound_utils::ConfigError;

use crate::{Config, ConfigSource};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// ```rust
    /// use netbound_config::Config;
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .network_timeout(Duration::from_secs(5))
    ///     .base_url("http://localhost:8000/api/")
    ///     .build()
    ///     .expect("valid config");
    /// assert_eq!(config.network.timeout_ms, 5000);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// Values not set keep their defaults. The result is attributed to
/// [`ConfigSource::Programmatic`] and validated by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    network_timeout: Option<Duration>,
    startup_delay: Option<Duration>,
    probe_addr: Option<String>,
    probe_timeout: Option<Duration>,
    base_url: Option<String>,
    request_timeout: Option<Duration>,
    data_dir: Option<PathBuf>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Watchdog budget for a network round-trip.
    #[must_use]
    pub fn network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = Some(timeout);
        self
    }

    /// Delay inserted before the remote call.
    #[must_use]
    pub fn startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn probe_addr(mut self, addr: impl Into<String>) -> Self {
        self.probe_addr = Some(addr.into());
        self
    }

    #[must_use]
    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let mut config = Config::default();

        if let Some(timeout) = self.network_timeout {
            config.network.timeout_ms = millis(timeout);
        }
        if let Some(delay) = self.startup_delay {
            config.network.startup_delay_ms = millis(delay);
        }
        if let Some(addr) = self.probe_addr {
            config.network.probe_addr = Some(addr);
        }
        if let Some(timeout) = self.probe_timeout {
            config.network.probe_timeout_ms = millis(timeout);
        }
        if let Some(url) = self.base_url {
            config.api.base_url = url;
        }
        if let Some(timeout) = self.request_timeout {
            config.api.request_timeout_ms = millis(timeout);
        }
        if let Some(dir) = self.data_dir {
            config.storage.data_dir = Some(dir);
        }
        config.source = ConfigSource::Programmatic;

        config.validate()?;
        Ok(config)
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
