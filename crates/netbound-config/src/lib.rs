//! Configuration model, discovery, and validation for netbound
//!
//! [`Config`] is loaded from TOML (see [`Config::discover`]) or assembled with
//! [`Config::builder`]. Values are validated before they are handed out.

mod builder;
mod discovery;
mod model;
mod validation;

pub use builder::ConfigBuilder;
pub use discovery::CONFIG_ENV_VAR;
pub use model::{
    ApiConfig, Config, ConfigSource, DEFAULT_BASE_URL, DEFAULT_NETWORK_TIMEOUT_MS,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_STARTUP_DELAY_MS,
    NetworkConfig, StorageConfig,
};
