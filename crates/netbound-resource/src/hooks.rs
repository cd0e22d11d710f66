//! Per-use-site extension points of the orchestrator

use std::future::Future;
use std::pin::Pin;

use netbound_utils::FailureKind;
use tracing::error;

use crate::envelope::ResponseEnvelope;
use crate::job::{CancelCause, current_job};
use crate::messages::error_state;
use crate::orchestrator::panic_message;
use crate::state::{ResourceState, Severity};

/// Boxed future returned by a hook.
pub type HookFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type CreateCall<R> = Box<dyn FnOnce() -> HookFuture<ResponseEnvelope<R>> + Send>;
type HandleSuccess<R, T> = Box<dyn FnOnce(R) -> HookFuture<ResourceState<T>> + Send>;
type CacheOnly<T> = Box<dyn FnOnce() -> HookFuture<ResourceState<T>> + Send>;

/// The three functions a use site supplies to the orchestrator.
///
/// `R` is the response body type of the remote call; `T` the view state
/// published to observers.
pub struct ResourceHooks<R, T> {
    pub(crate) create_call: CreateCall<R>,
    pub(crate) handle_success: HandleSuccess<R, T>,
    pub(crate) create_cache_only_result: CacheOnly<T>,
}

impl<R, T> std::fmt::Debug for ResourceHooks<R, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHooks").finish_non_exhaustive()
    }
}

impl<R: Send + 'static, T: Send + 'static> ResourceHooks<R, T> {
    pub fn new<C, CF, H, HF, K, KF>(
        create_call: C,
        handle_success: H,
        create_cache_only_result: K,
    ) -> Self
    where
        C: FnOnce() -> CF + Send + 'static,
        CF: Future<Output = ResponseEnvelope<R>> + Send + 'static,
        H: FnOnce(R) -> HF + Send + 'static,
        HF: Future<Output = ResourceState<T>> + Send + 'static,
        K: FnOnce() -> KF + Send + 'static,
        KF: Future<Output = ResourceState<T>> + Send + 'static,
    {
        Self {
            create_call: Box::new(move || Box::pin(create_call())),
            handle_success: Box::new(move |body| Box::pin(handle_success(body))),
            create_cache_only_result: Box::new(move || Box::pin(create_cache_only_result())),
        }
    }

    /// Hooks for a request that always makes a remote call.
    pub fn network<C, CF, H, HF>(create_call: C, handle_success: H) -> Self
    where
        C: FnOnce() -> CF + Send + 'static,
        CF: Future<Output = ResponseEnvelope<R>> + Send + 'static,
        H: FnOnce(R) -> HF + Send + 'static,
        HF: Future<Output = ResourceState<T>> + Send + 'static,
    {
        Self::new(create_call, handle_success, || async { unused_hook() })
    }

    /// Hooks for a request answered from local state only.
    pub fn cache_only<K, KF>(create_cache_only_result: K) -> Self
    where
        K: FnOnce() -> KF + Send + 'static,
        KF: Future<Output = ResourceState<T>> + Send + 'static,
    {
        Self::new(
            || async { ResponseEnvelope::Empty },
            |_| async { unused_hook() },
            create_cache_only_result,
        )
    }
}

/// Run synchronous work of a hook, such as storage writes, on the blocking pool.
///
/// Call from inside a hook future. A panic in `work` cancels the request with
/// [`CancelCause::Failure`] carrying the panic message.
pub async fn run_blocking<T, F>(work: F) -> ResourceState<T>
where
    T: Send + 'static,
    F: FnOnce() -> ResourceState<T> + Send + 'static,
{
    let job = current_job();
    match tokio::task::spawn_blocking(work).await {
        Ok(state) => state,
        Err(err) => {
            let message = if err.is_panic() {
                panic_message(err.into_panic())
            } else {
                err.to_string()
            };
            error!(error = %message, "Blocking hook work failed");
            if let Some(job) = job {
                job.cancel(CancelCause::Failure(message.clone()));
            }
            error_state(Some(&message), Severity::Toast, FailureKind::Unknown)
        }
    }
}

fn unused_hook<T>() -> ResourceState<T> {
    tracing::warn!("Resource hook invoked on a path it was not configured for");
    ResourceState::error(crate::messages::ERROR_UNKNOWN, Severity::Toast, FailureKind::Unknown)
}
