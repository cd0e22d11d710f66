//! Normalized outcome of one remote call attempt

use serde::Serialize;

/// What the transport layer produced for one call.
///
/// Produced exactly once per attempt and consumed by the orchestrator, which
/// maps `Error` and `Empty` onto terminal error states and hands the body of
/// `Success` to the caller's success handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResponseEnvelope<T> {
    Success { body: T },
    Error { message: String },
    Empty,
}

impl<T> ResponseEnvelope<T> {
    #[must_use]
    pub fn success(body: T) -> Self {
        Self::Success { body }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Transform the body, keeping error and empty outcomes.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResponseEnvelope<U> {
        match self {
            Self::Success { body } => ResponseEnvelope::Success { body: f(body) },
            Self::Error { message } => ResponseEnvelope::Error { message },
            Self::Empty => ResponseEnvelope::Empty,
        }
    }
}
