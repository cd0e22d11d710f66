//! Lifecycle states observed over one request

use netbound_utils::FailureKind;
use serde::Serialize;

/// How a message should be surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocking acknowledgement required
    Dialog,
    /// Transient, non-blocking notice
    Toast,
    /// Silent state change
    None,
}

/// Benign message attached to a successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
}

impl Notice {
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

/// One state in a request's observable stream.
///
/// A stream starts with exactly one `Loading` and ends with exactly one of
/// `Success` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResourceState<T> {
    Loading {
        cached: Option<T>,
    },
    Success {
        data: T,
        #[serde(skip_serializing_if = "Option::is_none")]
        notice: Option<Notice>,
    },
    Error {
        message: String,
        severity: Severity,
        kind: FailureKind,
    },
}

impl<T> ResourceState<T> {
    #[must_use]
    pub fn loading() -> Self {
        Self::Loading { cached: None }
    }

    #[must_use]
    pub fn success(data: T) -> Self {
        Self::Success { data, notice: None }
    }

    #[must_use]
    pub fn success_with_notice(data: T, notice: Notice) -> Self {
        Self::Success {
            data,
            notice: Some(notice),
        }
    }

    /// Error state with the message taken verbatim.
    ///
    /// Use [`error_state`](crate::error_state) for messages that come from
    /// outside and may need normalizing.
    #[must_use]
    pub fn error(message: impl Into<String>, severity: Severity, kind: FailureKind) -> Self {
        Self::Error {
            message: message.into(),
            severity,
            kind,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Loading { cached } => cached.as_ref(),
            Self::Error { .. } => None,
        }
    }

    /// User-facing message: the error message or the success notice.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Error { message, .. } => Some(message),
            Self::Success {
                notice: Some(notice),
                ..
            } => Some(&notice.message),
            _ => None,
        }
    }

    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Error { severity, .. } => Some(*severity),
            Self::Success {
                notice: Some(notice),
                ..
            } => Some(notice.severity),
            _ => None,
        }
    }

    /// Failure classification; `None` for non-error states.
    #[must_use]
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResourceState<U> {
        match self {
            Self::Loading { cached } => ResourceState::Loading {
                cached: cached.map(f),
            },
            Self::Success { data, notice } => ResourceState::Success {
                data: f(data),
                notice,
            },
            Self::Error {
                message,
                severity,
                kind,
            } => ResourceState::Error {
                message,
                severity,
                kind,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_loading_is_non_terminal() {
        assert!(!ResourceState::<u8>::loading().is_terminal());
        assert!(ResourceState::success(1u8).is_terminal());
        assert!(
            ResourceState::<u8>::error("x", Severity::Toast, FailureKind::Unknown).is_terminal()
        );
    }

    #[test]
    fn test_accessors() {
        let state = ResourceState::success_with_notice(
            7u8,
            Notice::new("nothing found", Severity::None),
        );
        assert_eq!(state.data(), Some(&7));
        assert_eq!(state.message(), Some("nothing found"));
        assert_eq!(state.severity(), Some(Severity::None));
        assert_eq!(state.failure_kind(), None);

        let err = ResourceState::<u8>::error("boom", Severity::Dialog, FailureKind::RemoteError);
        assert_eq!(err.data(), None);
        assert_eq!(err.failure_kind(), Some(FailureKind::RemoteError));
    }

    #[test]
    fn test_serialized_error_shape() {
        let err = ResourceState::<u8>::error("boom", Severity::Dialog, FailureKind::EmptyResponse);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["severity"], "dialog");
        assert_eq!(value["kind"], "empty_response");
    }

    #[test]
    fn test_success_without_notice_omits_field() {
        let value = serde_json::to_value(ResourceState::success(1u8)).unwrap();
        assert_eq!(value, serde_json::json!({"status": "success", "data": 1}));
    }
}
