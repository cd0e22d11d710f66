//! Foundation utilities shared by every netbound crate.

pub mod atomic_write;
pub mod error;
pub mod exit_codes;
pub mod logging;

pub use error::{
    ConfigError, ErrorCategory, FailureKind, NetboundError, SettingsError, StorageError,
    TransportError, UserFriendlyError,
};
pub use exit_codes::ExitCode;
