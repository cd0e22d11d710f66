//! Observable side of a request

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::job::{CancelCause, RequestJob, next_request_id};
use crate::state::ResourceState;

const STREAM_CAPACITY: usize = 8;

struct Published<T> {
    latest: ResourceState<T>,
    terminated: bool,
    /// Dropped when the request is detached, which closes every stream.
    events: Option<broadcast::Sender<ResourceState<T>>>,
}

/// Single writer of a request's state stream.
///
/// Publication and subscription share one lock, so a subscriber created after
/// the terminal state still observes it exactly once and nothing is ever
/// published after a terminal state.
pub(crate) struct StatePublisher<T> {
    published: Mutex<Published<T>>,
}

impl<T: Clone> StatePublisher<T> {
    pub(crate) fn new() -> Self {
        let (events, _) = broadcast::channel(STREAM_CAPACITY);
        Self {
            published: Mutex::new(Published {
                latest: ResourceState::loading(),
                terminated: false,
                events: Some(events),
            }),
        }
    }

    /// Publish `state`. Returns `false` if a terminal state was already out
    /// or the stream was detached.
    pub(crate) fn publish(&self, state: ResourceState<T>) -> bool {
        let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        if published.terminated {
            return false;
        }
        published.terminated = state.is_terminal();
        published.latest = state.clone();
        // No receivers is fine: current() still reports the state.
        if let Some(events) = &published.events {
            let _ = events.send(state);
        }
        true
    }

    /// End the stream without a terminal state.
    ///
    /// Observers drain what was already sent and then see the end of the
    /// stream. Returns `false` if a terminal state was already out.
    pub(crate) fn detach(&self) -> bool {
        let mut published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        if published.terminated {
            return false;
        }
        published.terminated = true;
        published.events = None;
        true
    }

    pub(crate) fn subscribe(&self) -> StateStream<T> {
        let published = self.published.lock().unwrap_or_else(PoisonError::into_inner);
        StateStream {
            receiver: published.events.as_ref().map(broadcast::Sender::subscribe),
            replay: published
                .latest
                .is_terminal()
                .then(|| published.latest.clone()),
            finished: false,
        }
    }

    pub(crate) fn current(&self) -> ResourceState<T> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
            .clone()
    }
}

/// One observer's view of a request's states.
pub struct StateStream<T> {
    receiver: Option<broadcast::Receiver<ResourceState<T>>>,
    replay: Option<ResourceState<T>>,
    finished: bool,
}

impl<T: Clone> StateStream<T> {
    /// Next state, or `None` once the terminal state has been returned or
    /// the request was superseded.
    pub async fn next_state(&mut self) -> Option<ResourceState<T>> {
        if self.finished {
            return None;
        }
        if let Some(state) = self.replay.take() {
            self.finished = true;
            return Some(state);
        }
        let Some(receiver) = self.receiver.as_mut() else {
            self.finished = true;
            return None;
        };
        loop {
            match receiver.recv().await {
                Ok(state) => {
                    self.finished = state.is_terminal();
                    return Some(state);
                }
                // A slow observer may skip intermediate states, never the terminal one.
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => {
                    self.finished = true;
                    return None;
                }
            }
        }
    }

    /// Drain the stream and return the terminal state.
    pub async fn terminal(mut self) -> Option<ResourceState<T>> {
        let mut last = None;
        while let Some(state) = self.next_state().await {
            last = Some(state);
        }
        last.filter(ResourceState::is_terminal)
    }
}

/// Handle returned to the creator of a request.
///
/// Owns the first stream subscription, taken before `Loading` is published,
/// so the creator always observes the complete sequence.
pub struct ResourceHandle<T> {
    request_id: u64,
    stream: StateStream<T>,
    publisher: Arc<StatePublisher<T>>,
    job: Option<Arc<RequestJob>>,
}

impl<T> std::fmt::Debug for ResourceHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("request_id", &self.request_id)
            .field("job", &self.job)
            .finish_non_exhaustive()
    }
}

impl<T: Clone> ResourceHandle<T> {
    pub(crate) fn new(
        request_id: u64,
        stream: StateStream<T>,
        publisher: Arc<StatePublisher<T>>,
        job: Option<Arc<RequestJob>>,
    ) -> Self {
        Self {
            request_id,
            stream,
            publisher,
            job,
        }
    }

    /// A handle whose stream is the single state `state`.
    ///
    /// Used for pre-flight short-circuits where no orchestrator runs.
    #[must_use]
    pub fn immediate(state: ResourceState<T>) -> Self {
        let publisher = Arc::new(StatePublisher::new());
        let stream = publisher.subscribe();
        publisher.publish(state);
        Self::new(next_request_id(), stream, publisher, None)
    }

    #[must_use]
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// The job backing this request; `None` for short-circuited requests.
    #[must_use]
    pub fn job(&self) -> Option<&Arc<RequestJob>> {
        self.job.as_ref()
    }

    /// An additional observer. Late subscribers may miss `Loading`.
    #[must_use]
    pub fn subscribe(&self) -> StateStream<T> {
        self.publisher.subscribe()
    }

    /// Latest published state.
    #[must_use]
    pub fn current(&self) -> ResourceState<T> {
        self.publisher.current()
    }

    pub async fn next_state(&mut self) -> Option<ResourceState<T>> {
        self.stream.next_state().await
    }

    /// Wait for the terminal state.
    ///
    /// A superseded request has none; its last published state is returned.
    pub async fn terminal(self) -> ResourceState<T> {
        let Self {
            stream, publisher, ..
        } = self;
        match stream.terminal().await {
            Some(state) => state,
            None => publisher.current(),
        }
    }

    /// Cancel the request. Returns `false` if it had already finished.
    pub fn cancel(&self) -> bool {
        self.job
            .as_ref()
            .is_some_and(|job| job.cancel(CancelCause::Caller))
    }
}
