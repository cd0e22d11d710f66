//! User-facing messages and error normalization

use netbound_utils::FailureKind;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::state::{ResourceState, Severity};

/// Network probe was negative at request start
pub const ERROR_NO_NETWORK: &str = "operation requires network";

/// Transport returned no content
pub const ERROR_EMPTY_RESPONSE: &str = "request returned no content";

/// Cancellation or failure without a cause
pub const ERROR_UNKNOWN: &str = "unknown error";

/// Replacement for any connectivity failure signature
pub const ERROR_CHECK_NETWORK_CONNECTION: &str = "Check your network connection.";

/// Cause attached to watchdog cancellations
pub const UNABLE_TO_RESOLVE_HOST: &str = "Unable to resolve host";

static CONNECTIVITY_FAILURE: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)(unable to resolve host|could not resolve host|failed to lookup address|dns error|connection refused|failed to connect|error trying to connect|network is unreachable|no route to host)",
    )
    .ok()
});

/// Whether a message carries a known connectivity-failure signature.
#[must_use]
pub fn is_connectivity_failure(message: &str) -> bool {
    CONNECTIVITY_FAILURE
        .as_ref()
        .is_some_and(|re| re.is_match(message))
}

/// Build a terminal error state from an externally sourced message.
///
/// An absent or blank message becomes [`ERROR_UNKNOWN`]. Connectivity
/// signatures are replaced by [`ERROR_CHECK_NETWORK_CONNECTION`] and a
/// `Dialog` severity is downgraded to `Toast`. The kind is kept as given.
#[must_use]
pub fn error_state<T>(message: Option<&str>, severity: Severity, kind: FailureKind) -> ResourceState<T> {
    match message.map(str::trim).filter(|m| !m.is_empty()) {
        None => ResourceState::error(ERROR_UNKNOWN, severity, kind),
        Some(m) if is_connectivity_failure(m) => {
            let severity = match severity {
                Severity::Dialog => Severity::Toast,
                other => other,
            };
            ResourceState::error(ERROR_CHECK_NETWORK_CONNECTION, severity, kind)
        }
        Some(m) => ResourceState::error(m, severity, kind),
    }
}
