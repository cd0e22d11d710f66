//! Network-bound resource orchestration.
//!
//! A request starts in `Loading`, races a remote call against a watchdog (or
//! answers from local state), and ends in exactly one terminal state. Callers
//! observe the states through a [`ResourceHandle`].
//!
//! ```no_run
//! use netbound_resource::{
//!     NetworkBoundResource, ResourceHooks, ResourceRequest, ResourceState, ResponseEnvelope,
//! };
//!
//! # async fn demo() {
//! let hooks = ResourceHooks::network(
//!     || async { ResponseEnvelope::success(41u32) },
//!     |body| async move { ResourceState::success(body + 1) },
//! );
//! let handle = NetworkBoundResource::start(ResourceRequest::new("answer"), hooks);
//! assert_eq!(handle.terminal().await, ResourceState::success(42));
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod handle;
pub mod hooks;
pub mod job;
pub mod messages;
pub mod orchestrator;
pub mod slot;
pub mod state;

pub use config::ResourceConfig;
pub use envelope::ResponseEnvelope;
pub use handle::{ResourceHandle, StateStream};
pub use hooks::{HookFuture, ResourceHooks, run_blocking};
pub use job::{CancelCause, JobState, RequestJob, current_job};
pub use messages::{
    ERROR_CHECK_NETWORK_CONNECTION, ERROR_EMPTY_RESPONSE, ERROR_NO_NETWORK, ERROR_UNKNOWN,
    UNABLE_TO_RESOLVE_HOST, error_state, is_connectivity_failure,
};
pub use orchestrator::{NetworkBoundResource, ResourceRequest};
pub use slot::JobSlot;
pub use state::{Notice, ResourceState, Severity};
