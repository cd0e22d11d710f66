//! At most one active job per logical operation

use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::job::{CancelCause, RequestJob};

/// A logical request identity, such as "the current login attempt".
///
/// Occupying the slot supersedes whatever job held it before; the superseded
/// request publishes no further state and its streams end.
#[derive(Debug)]
pub struct JobSlot {
    name: &'static str,
    current: Mutex<Option<Arc<RequestJob>>>,
}

impl JobSlot {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Install `job` as the active job, superseding the previous occupant.
    pub fn occupy(&self, job: Arc<RequestJob>) {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(job);
        if let Some(previous) = previous
            && previous.supersede()
        {
            debug!(slot = self.name, request_id = previous.id(), "Superseded active job");
        }
    }

    /// Cancel the active job, publishing an error on its stream.
    ///
    /// Returns `true` if a pending job was cancelled.
    pub fn cancel_active(&self) -> bool {
        let current = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        current.is_some_and(|job| job.cancel(CancelCause::Caller))
    }

    /// The occupant, if it is still pending.
    #[must_use]
    pub fn active(&self) -> Option<Arc<RequestJob>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .filter(|job| job.is_pending())
            .cloned()
    }
}
