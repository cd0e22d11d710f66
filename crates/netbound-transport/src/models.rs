//! Request and response bodies of the account endpoints

use serde::{Deserialize, Serialize};

/// Value of `response` when the server rejected the credentials.
///
/// The server reports this with a 2xx status, so it arrives as a successful
/// envelope and has to be recognised by the caller.
pub const GENERIC_AUTH_ERROR: &str = "Error";

/// Body of `POST account/login`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    #[serde(rename = "username")]
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Body of `POST account/register`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationRequest {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "password2")]
    pub confirm_password: String,
}

impl RegistrationRequest {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }
}

impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("confirm_password", &"[redacted]")
            .finish()
    }
}

fn missing_pk() -> i64 {
    -1
}

/// Body returned by `account/login`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "missing_pk")]
    pub pk: i64,
    #[serde(default)]
    pub email: String,
}

/// Body returned by `account/register`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(default = "missing_pk")]
    pub pk: i64,
    #[serde(default)]
    pub token: String,
}

/// Fields shared by both auth responses.
pub trait AuthResponse {
    fn response(&self) -> &str;
    fn error_message(&self) -> &str;
    fn pk(&self) -> i64;
    fn email(&self) -> &str;
    fn token(&self) -> &str;

    /// Username, when the endpoint returns one.
    fn username(&self) -> &str {
        ""
    }

    /// Whether the server rejected the request inside a 2xx body.
    fn is_generic_auth_error(&self) -> bool {
        self.response() == GENERIC_AUTH_ERROR
    }
}

impl AuthResponse for LoginResponse {
    fn response(&self) -> &str {
        &self.response
    }
    fn error_message(&self) -> &str {
        &self.error_message
    }
    fn pk(&self) -> i64 {
        self.pk
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn token(&self) -> &str {
        &self.token
    }
}

impl AuthResponse for RegistrationResponse {
    fn response(&self) -> &str {
        &self.response
    }
    fn error_message(&self) -> &str {
        &self.error_message
    }
    fn pk(&self) -> i64 {
        self.pk
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn token(&self) -> &str {
        &self.token
    }
    fn username(&self) -> &str {
        &self.username
    }
}
