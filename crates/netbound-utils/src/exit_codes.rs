//! Exit code constants and failure kind mapping for the netbound CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Request ended in `Success` |
//! | 1 | `INTERNAL` | Unknown failure or internal error |
//! | 2 | `INVALID_INPUT` | Field validation or configuration rejected the input |
//! | 3 | `NO_NETWORK` | Network unavailable at request start |
//! | 4 | `PERSISTENCE` | Local storage write failed |
//! | 5 | `REMOTE` | Remote returned an error or no content |
//! | 10 | `TIMEOUT` | Watchdog timed the request out |

use crate::error::{FailureKind, NetboundError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const INTERNAL: ExitCode = ExitCode(1);
    pub const INVALID_INPUT: ExitCode = ExitCode(2);
    pub const NO_NETWORK: ExitCode = ExitCode(3);
    pub const PERSISTENCE: ExitCode = ExitCode(4);
    pub const REMOTE: ExitCode = ExitCode(5);
    pub const TIMEOUT: ExitCode = ExitCode(10);

    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl From<FailureKind> for ExitCode {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::NoNetwork => Self::NO_NETWORK,
            FailureKind::ValidationFailure => Self::INVALID_INPUT,
            FailureKind::Timeout => Self::TIMEOUT,
            FailureKind::RemoteError | FailureKind::EmptyResponse => Self::REMOTE,
            FailureKind::PersistenceFailure => Self::PERSISTENCE,
            FailureKind::Unknown => Self::INTERNAL,
        }
    }
}

impl From<&NetboundError> for ExitCode {
    fn from(err: &NetboundError) -> Self {
        match err {
            NetboundError::Config(_) => Self::INVALID_INPUT,
            NetboundError::Settings(_) | NetboundError::Storage(_) => Self::PERSISTENCE,
            NetboundError::Transport(_) | NetboundError::Io(_) => Self::INTERNAL,
        }
    }
}
