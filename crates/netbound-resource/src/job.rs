//! Cancellable unit of in-flight work for one request

use std::future::Future;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::debug;

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

tokio::task_local! {
    static ACTIVE_JOB: Arc<RequestJob>;
}

/// Allocate a process-unique request id.
pub(crate) fn next_request_id() -> u64 {
    NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed)
}

/// Run `work` with `job` visible to [`current_job`].
pub(crate) async fn with_job<F: Future>(job: Arc<RequestJob>, work: F) -> F::Output {
    ACTIVE_JOB.scope(job, work).await
}

/// The job of the request whose hook is running on this task.
///
/// `None` outside a hook. Not visible from blocking threads, so capture it
/// before handing work to one.
#[must_use]
pub fn current_job() -> Option<Arc<RequestJob>> {
    ACTIVE_JOB.try_with(Arc::clone).ok()
}

/// Lifecycle of a [`RequestJob`]. Both non-pending states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JobState {
    Pending = 0,
    Completed = 1,
    Cancelled = 2,
}

impl JobState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Pending,
            1 => Self::Completed,
            _ => Self::Cancelled,
        }
    }
}

/// Why a job was cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelCause {
    /// The watchdog budget elapsed
    Timeout,
    /// A caller asked for cancellation without a reason
    Caller,
    /// The call path failed outside the envelope contract
    Failure(String),
    /// A newer request took over the job's slot; no error is published
    Superseded,
}

impl CancelCause {
    /// Message handed to the cancellation handler, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Timeout => Some(crate::messages::UNABLE_TO_RESOLVE_HOST),
            Self::Failure(message) => Some(message),
            Self::Caller | Self::Superseded => None,
        }
    }
}

type CancelHandler = Box<dyn FnOnce(&CancelCause) + Send>;

/// In-flight work for one request.
///
/// Exactly one of [`complete`](Self::complete) and [`cancel`](Self::cancel)
/// ever succeeds; the loser is a no-op. Either transition fires the job's
/// cancellation token, which wakes the watchdog and unwinds the call path.
pub struct RequestJob {
    id: u64,
    state: AtomicU8,
    token: CancellationToken,
    on_cancel: Mutex<Option<CancelHandler>>,
}

impl std::fmt::Debug for RequestJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestJob")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl RequestJob {
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self {
            id,
            state: AtomicU8::new(JobState::Pending as u8),
            token: CancellationToken::new(),
            on_cancel: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        JobState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == JobState::Pending
    }

    /// Install the handler run when a cancellation wins.
    ///
    /// Replaces any previous handler. Has no effect once the job is finished.
    pub fn invoke_on_cancellation(&self, handler: impl FnOnce(&CancelCause) + Send + 'static) {
        let mut slot = self.on_cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if self.is_pending() {
            *slot = Some(Box::new(handler));
        }
    }

    /// Mark the job completed. Returns `false` if it had already finished.
    pub fn complete(&self) -> bool {
        if !self.transition(JobState::Completed) {
            return false;
        }
        self.on_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.token.cancel();
        true
    }

    /// Cancel the job and run the cancellation handler with `cause`.
    ///
    /// Returns `false` if the job had already completed or been cancelled.
    pub fn cancel(&self, cause: CancelCause) -> bool {
        if !self.transition(JobState::Cancelled) {
            return false;
        }
        self.token.cancel();

        let handler = self
            .on_cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        debug!(request_id = self.id, cause = ?cause, "Request job cancelled");
        if let Some(handler) = handler {
            handler(&cause);
        }
        true
    }

    /// Cancel because a newer request replaced this one.
    pub fn supersede(&self) -> bool {
        self.cancel(CancelCause::Superseded)
    }

    /// Resolves once the job has completed or been cancelled.
    pub fn finished(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    fn transition(&self, to: JobState) -> bool {
        self.state
            .compare_exchange(
                JobState::Pending as u8,
                to as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}
