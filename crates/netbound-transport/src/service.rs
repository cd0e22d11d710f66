//! Auth transport contract and its HTTP implementation

use async_trait::async_trait;
use netbound_config::ApiConfig;
use netbound_resource::ResponseEnvelope;
use netbound_utils::TransportError;

use crate::http::HttpClient;
use crate::models::{LoginRequest, LoginResponse, RegistrationRequest, RegistrationResponse};

pub const LOGIN_PATH: &str = "account/login";
pub const REGISTER_PATH: &str = "account/register";

/// Remote account operations.
///
/// Each call yields exactly one envelope; failures are reported in the
/// envelope, never as a panic or a separate error channel.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, request: LoginRequest) -> ResponseEnvelope<LoginResponse>;

    async fn register(&self, request: RegistrationRequest) -> ResponseEnvelope<RegistrationResponse>;
}

/// [`AuthService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthService {
    client: HttpClient,
}

impl HttpAuthService {
    pub fn new(api: &ApiConfig) -> Result<Self, TransportError> {
        Ok(Self {
            client: HttpClient::new(api)?,
        })
    }

    #[must_use]
    pub fn from_client(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, request: LoginRequest) -> ResponseEnvelope<LoginResponse> {
        self.client.post_json(LOGIN_PATH, &request).await
    }

    async fn register(&self, request: RegistrationRequest) -> ResponseEnvelope<RegistrationResponse> {
        self.client.post_json(REGISTER_PATH, &request).await
    }
}
