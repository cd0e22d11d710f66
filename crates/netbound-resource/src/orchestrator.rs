//! Drives one request from `Loading` to exactly one terminal state

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use netbound_utils::FailureKind;
use netbound_utils::logging::{log_request_outcome, log_request_start, request_span};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{Instrument, debug, error, warn};

use crate::config::ResourceConfig;
use crate::envelope::ResponseEnvelope;
use crate::handle::{ResourceHandle, StatePublisher};
use crate::hooks::ResourceHooks;
use crate::job::{CancelCause, RequestJob, next_request_id, with_job};
use crate::messages::{ERROR_EMPTY_RESPONSE, ERROR_NO_NETWORK, error_state};
use crate::slot::JobSlot;
use crate::state::{ResourceState, Severity};

/// Parameters of one orchestrated request.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    operation: &'static str,
    network_available: bool,
    needs_network: bool,
    config: ResourceConfig,
    slot: Option<Arc<JobSlot>>,
}

impl ResourceRequest {
    /// A network request with default timing. `operation` labels logs.
    #[must_use]
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            network_available: true,
            needs_network: true,
            config: ResourceConfig::default(),
            slot: None,
        }
    }

    /// Result of the reachability probe taken at request start.
    #[must_use]
    pub fn network_available(mut self, available: bool) -> Self {
        self.network_available = available;
        self
    }

    /// Whether a remote round-trip is required; `false` uses the cache-only hook.
    #[must_use]
    pub fn needs_network(mut self, needs: bool) -> Self {
        self.needs_network = needs;
        self
    }

    #[must_use]
    pub fn config(mut self, config: ResourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Slot the request's job occupies, superseding its previous occupant.
    #[must_use]
    pub fn slot(mut self, slot: Arc<JobSlot>) -> Self {
        self.slot = Some(slot);
        self
    }

    #[must_use]
    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

/// Terminal-state sink shared by every path of one request.
struct Outcome<T> {
    operation: &'static str,
    request_id: u64,
    started: Instant,
    publisher: Arc<StatePublisher<T>>,
}

impl<T: Clone> Outcome<T> {
    fn finish(&self, state: ResourceState<T>) -> bool {
        let state = if state.is_terminal() {
            state
        } else {
            warn!(
                operation = self.operation,
                request_id = self.request_id,
                "Hook returned a non-terminal state"
            );
            error_state(None, Severity::Toast, FailureKind::Unknown)
        };

        let failure = state.failure_kind();
        let published = self.publisher.publish(state);
        if published {
            log_request_outcome(
                self.operation,
                self.request_id,
                failure,
                self.started.elapsed().as_millis(),
            );
        }
        published
    }

    fn detach(&self) {
        if self.publisher.detach() {
            debug!(
                operation = self.operation,
                request_id = self.request_id,
                "Request superseded; stream closed"
            );
        }
    }
}

/// Generic network-bound resource.
///
/// Every request publishes `Loading` first and then exactly one terminal
/// state:
///
/// - network unavailable: `Error` with [`ERROR_NO_NETWORK`], no job, no call;
/// - cache only: the result of the cache-only hook, no watchdog;
/// - otherwise the remote call races a watchdog. A successful envelope goes
///   through the success hook; error and empty envelopes become `Error`
///   states. A watchdog expiry, an explicit cancel, or a panic in the call
///   path cancels the job and publishes a `Toast` error instead.
///
/// A request superseded in its slot publishes nothing more; its streams end
/// without a terminal state.
pub struct NetworkBoundResource;

impl NetworkBoundResource {
    /// Start a request and return its handle.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn start<R, T>(request: ResourceRequest, hooks: ResourceHooks<R, T>) -> ResourceHandle<T>
    where
        R: Send + 'static,
        T: Clone + Send + 'static,
    {
        let request_id = next_request_id();
        let span = request_span(request.operation, request_id);
        span.in_scope(|| log_request_start(request.operation, request_id, request.needs_network));

        let publisher = Arc::new(StatePublisher::new());
        let stream = publisher.subscribe();
        publisher.publish(ResourceState::loading());

        let outcome = Arc::new(Outcome {
            operation: request.operation,
            request_id,
            started: Instant::now(),
            publisher: publisher.clone(),
        });

        if !request.network_available {
            span.in_scope(|| {
                outcome.finish(ResourceState::error(
                    ERROR_NO_NETWORK,
                    Severity::Dialog,
                    FailureKind::NoNetwork,
                ))
            });
            return ResourceHandle::new(request_id, stream, publisher, None);
        }

        let job = Arc::new(RequestJob::new(request_id));
        {
            let outcome = outcome.clone();
            let span = span.clone();
            job.invoke_on_cancellation(move |cause| {
                let kind = match cause {
                    CancelCause::Superseded => return outcome.detach(),
                    CancelCause::Timeout => FailureKind::Timeout,
                    CancelCause::Caller | CancelCause::Failure(_) => FailureKind::Unknown,
                };
                span.in_scope(|| outcome.finish(error_state(cause.message(), Severity::Toast, kind)));
            });
        }
        if let Some(slot) = &request.slot {
            slot.occupy(job.clone());
        }

        let main = if request.needs_network {
            tokio::spawn(
                watchdog(job.clone(), request.config.timeout).instrument(span.clone()),
            );
            tokio::spawn(
                call_path(job.clone(), outcome, request.config.startup_delay, hooks)
                    .instrument(span.clone()),
            )
        } else {
            tokio::spawn(cache_path(job.clone(), outcome, hooks).instrument(span.clone()))
        };
        tokio::spawn(supervise(job.clone(), main).instrument(span));

        ResourceHandle::new(request_id, stream, publisher, Some(job))
    }
}

async fn call_path<R, T: Clone>(
    job: Arc<RequestJob>,
    outcome: Arc<Outcome<T>>,
    startup_delay: Duration,
    hooks: ResourceHooks<R, T>,
) {
    let ResourceHooks {
        create_call,
        handle_success,
        ..
    } = hooks;

    let work = with_job(job.clone(), async move {
        if !startup_delay.is_zero() {
            sleep(startup_delay).await;
        }
        match create_call().await {
            ResponseEnvelope::Success { body } => handle_success(body).await,
            ResponseEnvelope::Error { message } => {
                error_state(Some(&message), Severity::Dialog, FailureKind::RemoteError)
            }
            ResponseEnvelope::Empty => ResourceState::error(
                ERROR_EMPTY_RESPONSE,
                Severity::Dialog,
                FailureKind::EmptyResponse,
            ),
        }
    });

    tokio::select! {
        biased;
        () = job.finished() => debug!("Call path unwound"),
        state = work => complete(&job, &outcome, state),
    }
}

async fn cache_path<R, T: Clone>(
    job: Arc<RequestJob>,
    outcome: Arc<Outcome<T>>,
    hooks: ResourceHooks<R, T>,
) {
    let lookup = with_job(job.clone(), (hooks.create_cache_only_result)());
    tokio::select! {
        biased;
        () = job.finished() => debug!("Cache path unwound"),
        state = lookup => complete(&job, &outcome, state),
    }
}

fn complete<T: Clone>(job: &RequestJob, outcome: &Outcome<T>, state: ResourceState<T>) {
    if job.complete() {
        outcome.finish(state);
    } else {
        debug!("Result arrived after the job finished; ignored");
    }
}

async fn watchdog(job: Arc<RequestJob>, timeout: Duration) {
    tokio::select! {
        biased;
        () = job.finished() => {}
        () = sleep(timeout) => {
            if job.cancel(CancelCause::Timeout) {
                warn!(timeout_ms = %timeout.as_millis(), "Request timed out");
            }
        }
    }
}

async fn supervise(job: Arc<RequestJob>, task: JoinHandle<()>) {
    if let Err(err) = task.await
        && err.is_panic()
    {
        let message = panic_message(err.into_panic());
        error!(panic = %message, "Request call path panicked");
        job.cancel(CancelCause::Failure(message));
    }
}

pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "request task panicked".to_string())
}
