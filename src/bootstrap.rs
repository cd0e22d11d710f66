//! Wire configuration to a ready-to-use [`AuthRepository`]

use std::io;
use std::sync::Arc;

use camino::Utf8PathBuf;
use netbound_auth::AuthRepository;
use netbound_config::Config;
use netbound_resource::ResourceConfig;
use netbound_store::{
    FileSettingsStore, LocalDatabase, NetworkProbe, StaticNetworkProbe, TcpNetworkProbe,
};
use netbound_transport::HttpAuthService;
use netbound_utils::NetboundError;
use tracing::info;

/// Data directory from the configuration, as a UTF-8 path.
pub fn data_dir(config: &Config) -> Result<Utf8PathBuf, NetboundError> {
    Utf8PathBuf::from_path_buf(config.data_dir()).map_err(|path| {
        NetboundError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("data directory is not valid UTF-8: {}", path.display()),
        ))
    })
}

/// Reachability probe for this process.
///
/// `offline` forces a negative answer; otherwise `[network] probe_addr`
/// selects a TCP probe, and without one the network is assumed reachable.
#[must_use]
pub fn network_probe(config: &Config, offline: bool) -> Arc<dyn NetworkProbe> {
    if offline {
        return Arc::new(StaticNetworkProbe::new(false));
    }
    match TcpNetworkProbe::from_config(&config.network) {
        Some(probe) => Arc::new(probe),
        None => Arc::new(StaticNetworkProbe::new(true)),
    }
}

/// Open the local stores under the data directory and build the repository.
pub fn open_repository(config: &Config, offline: bool) -> Result<AuthRepository, NetboundError> {
    let data_dir = data_dir(config)?;
    let database = Arc::new(LocalDatabase::open_in(&data_dir)?);
    let settings = Arc::new(FileSettingsStore::open_in(&data_dir)?);
    let service = Arc::new(HttpAuthService::new(&config.api)?);

    info!(
        data_dir = %data_dir,
        base_url = %config.api.base_url,
        config_source = %config.source,
        offline,
        "Opened auth repository"
    );

    Ok(
        AuthRepository::with_database(service, database, settings, network_probe(config, offline))
            .with_resource_config(ResourceConfig::from_config(config)),
    )
}
