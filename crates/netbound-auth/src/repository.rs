//! Login, registration and session resume

use std::sync::Arc;

use netbound_resource::{
    JobSlot, NetworkBoundResource, Notice, RequestJob, ResourceConfig, ResourceHandle,
    ResourceHooks, ResourceRequest, ResourceState, Severity, current_job, error_state,
    run_blocking,
};
use netbound_store::{
    AccountProperties, AccountPropertiesDao, AuthToken, AuthTokenDao, LocalDatabase,
    NetworkProbe, PREVIOUS_AUTH_USER, SettingsStore,
};
use netbound_transport::{
    AuthResponse, AuthService, LoginRequest, LoginResponse, RegistrationRequest,
    RegistrationResponse,
};
use netbound_utils::FailureKind;
use tracing::{debug, info, warn};

use crate::state::AuthViewState;
use crate::validation::{LoginFields, RegistrationFields, ValidationVerdict};

/// Terminal message when the credential could not be stored
pub const ERROR_SAVE_AUTH_TOKEN: &str = "could not save credentials";

/// Notice when there is no session to resume
pub const RESPONSE_CHECK_PREVIOUS_AUTH_USER_DONE: &str =
    "Done checking for previously authenticated user.";

/// Auth operations over [`NetworkBoundResource`].
///
/// All operations share one slot: starting any of them supersedes the one
/// still in flight.
pub struct AuthRepository {
    service: Arc<dyn AuthService>,
    accounts: Arc<dyn AccountPropertiesDao>,
    tokens: Arc<dyn AuthTokenDao>,
    settings: Arc<dyn SettingsStore>,
    probe: Arc<dyn NetworkProbe>,
    config: ResourceConfig,
    slot: Arc<JobSlot>,
}

impl std::fmt::Debug for AuthRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRepository")
            .field("config", &self.config)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl AuthRepository {
    pub fn new(
        service: Arc<dyn AuthService>,
        accounts: Arc<dyn AccountPropertiesDao>,
        tokens: Arc<dyn AuthTokenDao>,
        settings: Arc<dyn SettingsStore>,
        probe: Arc<dyn NetworkProbe>,
    ) -> Self {
        Self {
            service,
            accounts,
            tokens,
            settings,
            probe,
            config: ResourceConfig::default(),
            slot: Arc::new(JobSlot::new("auth")),
        }
    }

    /// Repository whose account and token tables live in one database.
    pub fn with_database(
        service: Arc<dyn AuthService>,
        database: Arc<LocalDatabase>,
        settings: Arc<dyn SettingsStore>,
        probe: Arc<dyn NetworkProbe>,
    ) -> Self {
        Self::new(service, database.clone(), database, settings, probe)
    }

    #[must_use]
    pub fn with_resource_config(mut self, config: ResourceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn attempt_login(&self, email: &str, password: &str) -> ResourceHandle<AuthViewState> {
        if let ValidationVerdict::Invalid { message } = LoginFields::new(email, password).validate() {
            return rejected("login", message);
        }

        let service = self.service.clone();
        let request = LoginRequest::new(email, password);
        let writer = self.credential_writer(email);
        let hooks = ResourceHooks::network(
            move || async move { service.login(request).await },
            move |body: LoginResponse| async move {
                let job = current_job();
                run_blocking(move || writer.save(&body, job.as_deref())).await
            },
        );
        NetworkBoundResource::start(self.request("login"), hooks)
    }

    pub fn attempt_registration(
        &self,
        email: &str,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> ResourceHandle<AuthViewState> {
        let fields = RegistrationFields::new(email, username, password, confirm_password);
        if let ValidationVerdict::Invalid { message } = fields.validate() {
            return rejected("register", message);
        }

        let service = self.service.clone();
        let request = RegistrationRequest::new(email, username, password, confirm_password);
        let writer = self.credential_writer(email);
        let hooks = ResourceHooks::network(
            move || async move { service.register(request).await },
            move |body: RegistrationResponse| async move {
                let job = current_job();
                run_blocking(move || writer.save(&body, job.as_deref())).await
            },
        );
        NetworkBoundResource::start(self.request("register"), hooks)
    }

    /// Resume the session of the last authenticated user from local state.
    ///
    /// Finds the remembered email's account and then its token; the outcome
    /// is `Success` either way, with a notice when nothing was found.
    pub fn check_previous_auth_user(&self) -> ResourceHandle<AuthViewState> {
        let Some(email) = self
            .settings
            .get_string(PREVIOUS_AUTH_USER)
            .filter(|email| !email.trim().is_empty())
        else {
            debug!("No previously authenticated user");
            return ResourceHandle::immediate(no_previous_user());
        };

        let accounts = self.accounts.clone();
        let tokens = self.tokens.clone();
        let hooks = ResourceHooks::<(), AuthViewState>::cache_only(move || {
            run_blocking(move || {
                let token = accounts
                    .search_by_email(&email)
                    .filter(|account| account.pk > -1)
                    .and_then(|account| tokens.search_by_pk(account.pk));
                match token {
                    Some(token) => ResourceState::success(AuthViewState::authenticated(token)),
                    None => {
                        debug!("Auth token not found for previous user");
                        no_previous_user()
                    }
                }
            })
        });
        NetworkBoundResource::start(
            self.request("check_previous_auth_user").needs_network(false),
            hooks,
        )
    }

    /// Cancel whatever auth operation is in flight.
    pub fn cancel_active_jobs(&self) -> bool {
        let cancelled = self.slot.cancel_active();
        if cancelled {
            info!("Cancelled active auth job");
        }
        cancelled
    }

    fn request(&self, operation: &'static str) -> ResourceRequest {
        ResourceRequest::new(operation)
            .network_available(self.probe.is_connected())
            .config(self.config)
            .slot(self.slot.clone())
    }

    fn credential_writer(&self, email: &str) -> CredentialWriter {
        CredentialWriter {
            accounts: self.accounts.clone(),
            tokens: self.tokens.clone(),
            settings: self.settings.clone(),
            email: email.to_string(),
        }
    }
}

/// Persists a successful auth response.
struct CredentialWriter {
    accounts: Arc<dyn AccountPropertiesDao>,
    tokens: Arc<dyn AuthTokenDao>,
    settings: Arc<dyn SettingsStore>,
    email: String,
}

impl CredentialWriter {
    /// Store the credential and remember the user.
    ///
    /// `job` is the request being served. Each write is skipped once it has
    /// finished, so a request that already timed out or was cancelled stops
    /// persisting. A finish that lands after the last write still leaves the
    /// credential stored; the published state is then the timeout or cancel
    /// error.
    fn save<B: AuthResponse>(
        &self,
        body: &B,
        job: Option<&RequestJob>,
    ) -> ResourceState<AuthViewState> {
        // Rejected credentials come back as a 2xx with an error body.
        if body.is_generic_auth_error() {
            return error_state(
                Some(body.error_message()),
                Severity::Dialog,
                FailureKind::RemoteError,
            );
        }

        if abandoned(job) {
            return error_state(None, Severity::Toast, FailureKind::Unknown);
        }

        // The token row references the account row, so the account goes first.
        self.accounts.insert_or_ignore(&AccountProperties::new(
            body.pk(),
            body.email(),
            body.username(),
        ));

        let token = AuthToken::new(body.pk(), body.token());
        if self.tokens.insert(&token) < 0 {
            warn!(account_pk = body.pk(), "Auth token insert failed");
            return ResourceState::error(
                ERROR_SAVE_AUTH_TOKEN,
                Severity::Dialog,
                FailureKind::PersistenceFailure,
            );
        }

        if abandoned(job) {
            return error_state(None, Severity::Toast, FailureKind::Unknown);
        }
        if let Err(e) = self.settings.put_string(PREVIOUS_AUTH_USER, &self.email) {
            warn!(error = %e, "Could not remember authenticated user");
        }
        ResourceState::success(AuthViewState::authenticated(token))
    }
}

/// The request finished while its response was still being stored.
fn abandoned(job: Option<&RequestJob>) -> bool {
    let finished = job.is_some_and(|job| !job.is_pending());
    if finished {
        debug!("Request finished during persistence; remaining writes skipped");
    }
    finished
}

fn rejected(operation: &str, message: String) -> ResourceHandle<AuthViewState> {
    warn!(operation, message = %message, "Rejected by field validation");
    ResourceHandle::immediate(ResourceState::error(
        message,
        Severity::Dialog,
        FailureKind::ValidationFailure,
    ))
}

fn no_previous_user() -> ResourceState<AuthViewState> {
    ResourceState::success_with_notice(
        AuthViewState::default(),
        Notice::new(RESPONSE_CHECK_PREVIOUS_AUTH_USER_DONE, Severity::None),
    )
}
