use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use netbound_utils::ConfigError;
use tracing::debug;

use crate::{Config, ConfigSource};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "NETBOUND_CONFIG";

impl Config {
    /// Discover and load configuration.
    ///
    /// Precedence: `explicit` path > `NETBOUND_CONFIG` > platform config
    /// directory (`<config dir>/netbound/config.toml`) > defaults. An explicitly
    /// named file (argument or env var) must exist; the platform file is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::discover_with(
            explicit,
            std::env::var_os(CONFIG_ENV_VAR),
            dirs::config_dir().map(|d| d.join("netbound").join("config.toml")),
        )
    }

    /// Path-driven variant of [`discover`](Self::discover) used by tests to
    /// avoid process-global state.
    pub fn discover_with(
        explicit: Option<&Path>,
        env_value: Option<OsString>,
        platform_default: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_required(path);
        }
        if let Some(value) = env_value.filter(|v| !v.is_empty()) {
            debug!(var = CONFIG_ENV_VAR, "Using configuration path from environment");
            return Self::load_required(Path::new(&value));
        }
        if let Some(path) = platform_default.filter(|p| p.is_file()) {
            return Self::load_file(&path);
        }

        debug!("No configuration file found, using defaults");
        let config = Config::default();
        config.validate()?;
        Ok(config)
    }

    fn load_required(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            });
        }
        Self::load_file(path)
    }

    /// Load and validate a TOML configuration file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config = Self::from_toml_str(&text).map_err(|reason| ConfigError::InvalidFile {
            path: path.display().to_string(),
            reason,
        })?;
        config.source = ConfigSource::File(path.to_path_buf());
        config.validate()?;

        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    fn from_toml_str(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.message().to_string())
    }
}
