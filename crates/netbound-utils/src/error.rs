use std::fmt;
use std::io;

use serde::Serialize;
use strum::{AsRefStr, EnumIter};
use thiserror::Error;

/// Library-level error type for netbound.
///
/// `NetboundError` covers failures of the *infrastructure* around a request:
/// loading configuration, reading or writing durable settings, opening the
/// local database, constructing the HTTP transport. Failures of a single
/// request never surface as `NetboundError`; they are published as a terminal
/// `Error` resource state tagged with a [`FailureKind`].
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file or programmatic configuration errors |
/// | `Settings` | Durable settings store errors |
/// | `Storage` | Local database errors |
/// | `Transport` | HTTP client construction errors |
///
/// Use [`display_for_user()`](Self::display_for_user) for a message with
/// context and suggestions.
#[derive(Error, Debug)]
pub enum NetboundError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl NetboundError {
    /// Render the error with context and suggestions for terminal output.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let (message, context, suggestions) = match self {
            Self::Config(e) => (e.user_message(), e.context(), e.suggestions()),
            Self::Settings(e) => (e.user_message(), e.context(), e.suggestions()),
            Self::Storage(e) => (e.user_message(), e.context(), e.suggestions()),
            Self::Transport(e) => (e.user_message(), e.context(), e.suggestions()),
            Self::Io(e) => (format!("I/O failure: {e}"), None, Vec::new()),
        };

        let mut out = format!("error: {message}");
        if let Some(context) = context {
            out.push_str(&format!("\n  context: {context}"));
        }
        for suggestion in suggestions {
            out.push_str(&format!("\n  hint: {suggestion}"));
        }
        out
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    Network,
    Validation,
    Persistence,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::FileSystem => write!(f, "File System"),
            Self::Network => write!(f, "Network"),
            Self::Validation => write!(f, "Validation"),
            Self::Persistence => write!(f, "Persistence"),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Configuration validation failed: {error_count} errors")]
    ValidationFailed {
        errors: Vec<String>,
        error_count: usize,
    },

    #[error("Failed to read configuration file {path}: {reason}")]
    Unreadable { path: String, reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile { path, reason } => {
                format!("Configuration file {path} has invalid format: {reason}")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::ValidationFailed { errors, .. } => format!(
                "Configuration validation failed with {} errors: {}",
                errors.len(),
                errors.join(", ")
            ),
            Self::Unreadable { path, reason } => {
                format!("Could not read configuration file {path}: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => Some(
                "Configuration files are TOML with optional [network], [api] and [storage] tables."
                    .to_string(),
            ),
            Self::NotFound { .. } => Some(
                "netbound reads the path given with --config, then NETBOUND_CONFIG, then the platform config directory."
                    .to_string(),
            ),
            Self::InvalidValue { .. } | Self::ValidationFailed { .. } | Self::Unreadable { .. } => {
                None
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile { .. } => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Remove unknown keys; every table is optional".to_string(),
            ],
            Self::InvalidValue { key, .. } => match key.as_str() {
                "network.timeout_ms" | "network.startup_delay_ms" | "network.probe_timeout_ms" => {
                    vec!["Use a positive number of milliseconds".to_string()]
                }
                "api.base_url" => vec!["Use an absolute http:// or https:// URL".to_string()],
                _ => vec!["Remove the option to use the default value".to_string()],
            },
            Self::NotFound { .. } => vec![
                "Create the file or drop --config to run with defaults".to_string(),
                "Check the NETBOUND_CONFIG environment variable".to_string(),
            ],
            Self::ValidationFailed { .. } => {
                vec!["Fix each listed value and run again".to_string()]
            }
            Self::Unreadable { .. } => vec!["Check file permissions".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

/// Durable settings store errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write settings file {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Settings file {path} is corrupt: {reason}")]
    Corrupt { path: String, reason: String },
}

impl UserFriendlyError for SettingsError {
    fn user_message(&self) -> String {
        match self {
            Self::Read { path, .. } => format!("Could not read saved settings from {path}"),
            Self::Write { path, .. } => format!("Could not save settings to {path}"),
            Self::Corrupt { path, .. } => format!("Saved settings at {path} are unreadable"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Read { reason, .. } | Self::Write { reason, .. } | Self::Corrupt { reason, .. } => {
                Some(reason.clone())
            }
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Corrupt { path, .. } => {
                vec![format!("Delete {path}; it is recreated on the next login")]
            }
            Self::Read { .. } | Self::Write { .. } => {
                vec!["Check that the data directory is writable".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::FileSystem
    }
}

/// Local database errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to open database {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Failed to persist database {path}: {reason}")]
    Persist { path: String, reason: String },
}

impl UserFriendlyError for StorageError {
    fn user_message(&self) -> String {
        match self {
            Self::Open { path, .. } => format!("Could not open the local database at {path}"),
            Self::Persist { path, .. } => format!("Could not save the local database at {path}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Open { reason, .. } | Self::Persist { reason, .. } => Some(reason.clone()),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["Check that the data directory exists and is writable".to_string()]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Persistence
    }
}

/// HTTP transport construction errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl UserFriendlyError for TransportError {
    fn user_message(&self) -> String {
        match self {
            Self::ClientBuild(reason) => format!("Could not create the HTTP client: {reason}"),
            Self::InvalidBaseUrl { url, reason } => {
                format!("The API base URL '{url}' is invalid: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        None
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ClientBuild(_) => vec!["Check TLS certificates on this machine".to_string()],
            Self::InvalidBaseUrl { .. } => {
                vec!["Set [api] base_url to an absolute URL ending in '/'".to_string()]
            }
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Network
    }
}

/// Closed taxonomy of ways a single request can fail.
///
/// Every terminal `Error` state carries exactly one of these. None of them is
/// fatal to the process; each ends only the request it belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Network probe reported no connectivity before the request started
    NoNetwork,
    /// Field validation rejected the input before the request started
    ValidationFailure,
    /// The watchdog fired before the call resolved
    Timeout,
    /// Transport returned an explicit error envelope
    RemoteError,
    /// Transport returned no content
    EmptyResponse,
    /// A local write reported failure
    PersistenceFailure,
    /// Cancellation or failure without a usable cause
    Unknown,
}

impl FailureKind {
    /// Whether the failure was detected before any job was created.
    #[must_use]
    pub fn is_preflight(self) -> bool {
        matches!(self, Self::NoNetwork | Self::ValidationFailure)
    }

    #[must_use]
    pub fn category(self) -> ErrorCategory {
        match self {
            Self::NoNetwork | Self::Timeout | Self::RemoteError | Self::EmptyResponse => {
                ErrorCategory::Network
            }
            Self::ValidationFailure => ErrorCategory::Validation,
            Self::PersistenceFailure => ErrorCategory::Persistence,
            Self::Unknown => ErrorCategory::Network,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_failure_kind_display_is_snake_case() {
        assert_eq!(FailureKind::NoNetwork.to_string(), "no_network");
        assert_eq!(FailureKind::PersistenceFailure.as_ref(), "persistence_failure");
    }

    #[test]
    fn test_failure_kind_serializes_like_display() {
        for kind in FailureKind::iter() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_preflight_kinds() {
        let preflight: Vec<_> = FailureKind::iter().filter(|k| k.is_preflight()).collect();
        assert_eq!(
            preflight,
            vec![FailureKind::NoNetwork, FailureKind::ValidationFailure]
        );
    }

    #[test]
    fn test_display_for_user_includes_suggestions() {
        let err = NetboundError::Config(ConfigError::InvalidValue {
            key: "api.base_url".to_string(),
            value: "ftp://x".to_string(),
        });
        let text = err.display_for_user();
        assert!(text.starts_with("error: Configuration 'api.base_url'"));
        assert!(text.contains("hint: Use an absolute http:// or https:// URL"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            SettingsError::Corrupt {
                path: "p".into(),
                reason: "r".into()
            }
            .category(),
            ErrorCategory::FileSystem
        );
        assert_eq!(FailureKind::ValidationFailure.category().to_string(), "Validation");
    }
}
