use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use netbound_auth::{
    AuthRepository, AuthViewState, ERROR_PASSWORDS_MUST_MATCH, ERROR_SAVE_AUTH_TOKEN,
    RESPONSE_CHECK_PREVIOUS_AUTH_USER_DONE,
};
use netbound_resource::{
    CancelCause, ERROR_CHECK_NETWORK_CONNECTION, ERROR_NO_NETWORK, ERROR_UNKNOWN, RequestJob,
    ResourceConfig, ResourceHandle, ResourceState, ResponseEnvelope, Severity,
};
use netbound_store::{
    AccountProperties, AccountPropertiesDao, AuthToken, AuthTokenDao, InMemorySettingsStore,
    LocalDatabase, PREVIOUS_AUTH_USER, SettingsStore, StaticNetworkProbe,
};
use netbound_transport::{
    AuthService, LoginRequest, LoginResponse, RegistrationRequest, RegistrationResponse,
};
use netbound_utils::FailureKind;

struct ScriptedAuthService {
    login: ResponseEnvelope<LoginResponse>,
    register: ResponseEnvelope<RegistrationResponse>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedAuthService {
    fn new() -> Self {
        Self {
            login: ResponseEnvelope::success(login_body(1, "a@b.com", "T")),
            register: ResponseEnvelope::success(RegistrationResponse {
                response: "successfully registered new user.".to_string(),
                error_message: String::new(),
                email: "a@b.com".to_string(),
                username: "ann".to_string(),
                pk: 2,
                token: "R".to_string(),
            }),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuthService for ScriptedAuthService {
    async fn login(&self, _request: LoginRequest) -> ResponseEnvelope<LoginResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.login.clone()
    }

    async fn register(&self, _request: RegistrationRequest) -> ResponseEnvelope<RegistrationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.register.clone()
    }
}

fn login_body(pk: i64, email: &str, token: &str) -> LoginResponse {
    LoginResponse {
        response: "Successfully authenticated.".to_string(),
        error_message: String::new(),
        token: token.to_string(),
        pk,
        email: email.to_string(),
    }
}

/// Token table that refuses every insert.
struct RejectingTokens;

impl AuthTokenDao for RejectingTokens {
    fn insert(&self, _token: &AuthToken) -> i64 {
        -1
    }

    fn search_by_pk(&self, _account_pk: i64) -> Option<AuthToken> {
        None
    }
}

/// Token table whose insert loses the race to the watchdog.
struct TimingOutTokens {
    database: Arc<LocalDatabase>,
    job: Arc<OnceLock<Arc<RequestJob>>>,
}

impl AuthTokenDao for TimingOutTokens {
    fn insert(&self, token: &AuthToken) -> i64 {
        if let Some(job) = self.job.get() {
            job.cancel(CancelCause::Timeout);
        }
        AuthTokenDao::insert(&*self.database, token)
    }

    fn search_by_pk(&self, account_pk: i64) -> Option<AuthToken> {
        AuthTokenDao::search_by_pk(&*self.database, account_pk)
    }
}

struct Fixture {
    service: Arc<ScriptedAuthService>,
    database: Arc<LocalDatabase>,
    settings: Arc<InMemorySettingsStore>,
    probe: Arc<StaticNetworkProbe>,
    repository: AuthRepository,
}

fn fixture(service: ScriptedAuthService) -> Fixture {
    let service = Arc::new(service);
    let database = Arc::new(LocalDatabase::in_memory());
    let settings = Arc::new(InMemorySettingsStore::new());
    let probe = Arc::new(StaticNetworkProbe::new(true));
    let repository = AuthRepository::with_database(
        service.clone(),
        database.clone(),
        settings.clone(),
        probe.clone(),
    )
    .with_resource_config(ResourceConfig::default().with_timeout(Duration::from_secs(3)));
    Fixture {
        service,
        database,
        settings,
        probe,
        repository,
    }
}

async fn drain(mut handle: ResourceHandle<AuthViewState>) -> Vec<ResourceState<AuthViewState>> {
    let mut states = Vec::new();
    while let Some(state) = handle.next_state().await {
        states.push(state);
    }
    states
}

#[tokio::test(start_paused = true)]
async fn test_login_success_persists_and_remembers_user() {
    let fx = fixture(ScriptedAuthService::new());

    let states = drain(fx.repository.attempt_login("a@b.com", "pw")).await;

    assert_eq!(
        states,
        vec![
            ResourceState::loading(),
            ResourceState::success(AuthViewState::authenticated(AuthToken::new(1, "T"))),
        ]
    );
    assert_eq!(
        fx.settings.get_string(PREVIOUS_AUTH_USER).as_deref(),
        Some("a@b.com")
    );
    assert_eq!(fx.database.search_by_email("a@b.com").map(|a| a.pk), Some(1));
    assert_eq!(fx.service.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_login_without_network_only_publishes_error() {
    let fx = fixture(ScriptedAuthService::new());
    fx.probe.set_connected(false);

    let states = drain(fx.repository.attempt_login("a@b.com", "pw")).await;

    assert_eq!(
        states.last(),
        Some(&ResourceState::error(ERROR_NO_NETWORK, Severity::Dialog, FailureKind::NoNetwork))
    );
    assert_eq!(states.iter().filter(|s| s.is_terminal()).count(), 1);
    assert_eq!(fx.service.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_token_insert_failure_never_publishes_success() {
    let service = Arc::new(ScriptedAuthService::new());
    let settings = Arc::new(InMemorySettingsStore::new());
    let repository = AuthRepository::new(
        service,
        Arc::new(LocalDatabase::in_memory()),
        Arc::new(RejectingTokens),
        settings.clone(),
        Arc::new(StaticNetworkProbe::new(true)),
    );

    let states = drain(repository.attempt_login("a@b.com", "pw")).await;

    assert!(!states.iter().any(ResourceState::is_success));
    assert_eq!(
        states.last(),
        Some(&ResourceState::error(
            ERROR_SAVE_AUTH_TOKEN,
            Severity::Dialog,
            FailureKind::PersistenceFailure
        ))
    );
    assert_eq!(settings.get_string(PREVIOUS_AUTH_USER), None);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credentials_in_success_body() {
    let mut service = ScriptedAuthService::new();
    service.login = ResponseEnvelope::success(LoginResponse {
        response: "Error".to_string(),
        error_message: "Invalid credentials".to_string(),
        token: String::new(),
        pk: -1,
        email: String::new(),
    });
    let fx = fixture(service);

    let terminal = fx.repository.attempt_login("a@b.com", "wrong").terminal().await;

    assert_eq!(
        terminal,
        ResourceState::error("Invalid credentials", Severity::Dialog, FailureKind::RemoteError)
    );
    assert_eq!(fx.database.account_count(), 0);
    assert_eq!(fx.settings.get_string(PREVIOUS_AUTH_USER), None);
}

#[tokio::test(start_paused = true)]
async fn test_blank_login_fields_short_circuit() {
    let fx = fixture(ScriptedAuthService::new());

    let handle = fx.repository.attempt_login("", "pw");
    assert!(handle.job().is_none());
    let states = drain(handle).await;

    assert_eq!(states.len(), 1);
    assert_eq!(states[0].failure_kind(), Some(FailureKind::ValidationFailure));
    assert_eq!(states[0].severity(), Some(Severity::Dialog));
    assert_eq!(fx.service.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_registration_mismatch_short_circuits() {
    let fx = fixture(ScriptedAuthService::new());

    let terminal = fx
        .repository
        .attempt_registration("a@b.com", "ann", "pw1", "pw2")
        .terminal()
        .await;

    assert_eq!(
        terminal,
        ResourceState::error(
            ERROR_PASSWORDS_MUST_MATCH,
            Severity::Dialog,
            FailureKind::ValidationFailure
        )
    );
    assert_eq!(fx.service.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_registration_success_stores_username() {
    let fx = fixture(ScriptedAuthService::new());

    let terminal = fx
        .repository
        .attempt_registration("a@b.com", "ann", "pw", "pw")
        .terminal()
        .await;

    assert_eq!(
        terminal,
        ResourceState::success(AuthViewState::authenticated(AuthToken::new(2, "R")))
    );
    assert_eq!(
        AccountPropertiesDao::search_by_pk(fx.database.as_ref(), 2),
        Some(AccountProperties::new(2, "a@b.com", "ann"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_empty_registration_response() {
    let mut service = ScriptedAuthService::new();
    service.register = ResponseEnvelope::Empty;
    let fx = fixture(service);

    let terminal = fx
        .repository
        .attempt_registration("a@b.com", "ann", "pw", "pw")
        .terminal()
        .await;
    assert_eq!(terminal.failure_kind(), Some(FailureKind::EmptyResponse));
}

#[tokio::test(start_paused = true)]
async fn test_slow_login_times_out_without_persisting() {
    let mut service = ScriptedAuthService::new();
    service.delay = Duration::from_secs(10);
    let fx = fixture(service);

    let terminal = fx.repository.attempt_login("a@b.com", "pw").terminal().await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert_eq!(
        terminal,
        ResourceState::error(ERROR_CHECK_NETWORK_CONNECTION, Severity::Toast, FailureKind::Timeout)
    );
    assert_eq!(fx.database.account_count(), 0);
    assert_eq!(fx.settings.get_string(PREVIOUS_AUTH_USER), None);
}

#[tokio::test(start_paused = true)]
async fn test_new_attempt_supersedes_previous() {
    let mut service = ScriptedAuthService::new();
    service.delay = Duration::from_secs(1);
    let fx = fixture(service);

    let mut first = fx.repository.attempt_login("a@b.com", "pw");
    assert_eq!(first.next_state().await, Some(ResourceState::loading()));
    let second = fx.repository.attempt_login("a@b.com", "pw");

    assert!(second.terminal().await.is_success());
    assert_eq!(first.next_state().await, None);
    assert_eq!(first.terminal().await, ResourceState::loading());
}

#[tokio::test(start_paused = true)]
async fn test_timeout_during_persistence_skips_remembering_user() {
    let database = Arc::new(LocalDatabase::in_memory());
    let settings = Arc::new(InMemorySettingsStore::new());
    let job = Arc::new(OnceLock::new());
    let repository = AuthRepository::new(
        Arc::new(ScriptedAuthService::new()),
        database.clone(),
        Arc::new(TimingOutTokens {
            database: database.clone(),
            job: job.clone(),
        }),
        settings.clone(),
        Arc::new(StaticNetworkProbe::new(true)),
    );

    let handle = repository.attempt_login("a@b.com", "pw");
    job.set(handle.job().cloned().unwrap()).unwrap();

    assert_eq!(
        handle.terminal().await,
        ResourceState::error(ERROR_CHECK_NETWORK_CONNECTION, Severity::Toast, FailureKind::Timeout)
    );
    assert_eq!(settings.get_string(PREVIOUS_AUTH_USER), None);
    // The token write itself completed before the request finished.
    assert_eq!(database.token_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_active_jobs() {
    let mut service = ScriptedAuthService::new();
    service.delay = Duration::from_secs(2);
    let fx = fixture(service);

    let handle = fx.repository.attempt_login("a@b.com", "pw");
    assert!(fx.repository.cancel_active_jobs());
    assert!(!fx.repository.cancel_active_jobs());

    assert_eq!(
        handle.terminal().await,
        ResourceState::error(ERROR_UNKNOWN, Severity::Toast, FailureKind::Unknown)
    );
}

#[tokio::test(start_paused = true)]
async fn test_check_previous_without_marker() {
    let fx = fixture(ScriptedAuthService::new());

    let states = drain(fx.repository.check_previous_auth_user()).await;

    assert_eq!(states.len(), 1);
    assert_eq!(states[0].data(), Some(&AuthViewState::default()));
    assert_eq!(states[0].message(), Some(RESPONSE_CHECK_PREVIOUS_AUTH_USER_DONE));
    assert_eq!(states[0].severity(), Some(Severity::None));
}

#[tokio::test(start_paused = true)]
async fn test_check_previous_resumes_after_login() {
    let fx = fixture(ScriptedAuthService::new());
    assert!(
        fx.repository
            .attempt_login("a@b.com", "pw")
            .terminal()
            .await
            .is_success()
    );

    let states = drain(fx.repository.check_previous_auth_user()).await;

    assert_eq!(states.first(), Some(&ResourceState::loading()));
    assert_eq!(
        states.last(),
        Some(&ResourceState::success(AuthViewState::authenticated(AuthToken::new(1, "T"))))
    );
    assert_eq!(fx.service.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_check_previous_with_unknown_account() {
    let fx = fixture(ScriptedAuthService::new());
    fx.settings.put_string(PREVIOUS_AUTH_USER, "ghost@b.com").unwrap();

    let terminal = fx.repository.check_previous_auth_user().terminal().await;

    assert_eq!(terminal.data(), Some(&AuthViewState::default()));
    assert_eq!(terminal.message(), Some(RESPONSE_CHECK_PREVIOUS_AUTH_USER_DONE));
}

#[tokio::test(start_paused = true)]
async fn test_check_previous_while_offline_reports_no_network() {
    let fx = fixture(ScriptedAuthService::new());
    fx.settings.put_string(PREVIOUS_AUTH_USER, "a@b.com").unwrap();
    fx.probe.set_connected(false);

    let terminal = fx.repository.check_previous_auth_user().terminal().await;
    assert_eq!(terminal.failure_kind(), Some(FailureKind::NoNetwork));
}
