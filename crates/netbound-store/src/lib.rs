//! Local state for netbound.
//!
//! - [`LocalDatabase`]: account and token tables behind the DAO traits
//! - [`SettingsStore`]: durable key/value settings
//! - [`NetworkProbe`]: reachability check taken at request start

pub mod dao;
pub mod database;
pub mod models;
pub mod probe;
pub mod settings;

pub use dao::{AccountPropertiesDao, AuthTokenDao, INSERT_FAILED};
pub use database::{DATABASE_FILE, LocalDatabase};
pub use models::{AccountProperties, AuthToken};
pub use probe::{NetworkProbe, StaticNetworkProbe, TcpNetworkProbe};
pub use settings::{
    FileSettingsStore, InMemorySettingsStore, PREVIOUS_AUTH_USER, SETTINGS_FILE, SettingsStore,
};
