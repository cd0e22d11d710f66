//! netbound: network-bound async resources.
//!
//! A request starts in `Loading`, races its remote call against a watchdog
//! (or answers from local state), and ends in exactly one terminal state.
//! The auth repository builds login, registration and session resume on top
//! of that, persisting credentials locally.
//!
//! ```no_run
//! use netbound::{Config, ResourceState, bootstrap};
//!
//! # async fn demo() -> Result<(), netbound::NetboundError> {
//! let config = Config::discover(None)?;
//! let repository = bootstrap::open_repository(&config, false)?;
//! match repository.attempt_login("a@b.com", "secret").terminal().await {
//!     ResourceState::Success { data, .. } => println!("account {:?}", data.account_pk()),
//!     other => println!("{:?}", other.message()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod cli;

pub use netbound_auth::{
    AuthRepository, AuthViewState, LoginFields, RegistrationFields, ValidationVerdict,
};
pub use netbound_config::{Config, ConfigBuilder, ConfigSource};
pub use netbound_resource::{
    CancelCause, JobSlot, JobState, NetworkBoundResource, Notice, RequestJob, ResourceConfig,
    ResourceHandle, ResourceHooks, ResourceRequest, ResourceState, ResponseEnvelope, Severity,
    StateStream, error_state,
};
pub use netbound_store::{
    AccountProperties, AccountPropertiesDao, AuthToken, AuthTokenDao, FileSettingsStore,
    InMemorySettingsStore, LocalDatabase, NetworkProbe, SettingsStore, StaticNetworkProbe,
    TcpNetworkProbe,
};
pub use netbound_transport::{AuthService, HttpAuthService};
pub use netbound_utils::{ExitCode, FailureKind, NetboundError, UserFriendlyError};
