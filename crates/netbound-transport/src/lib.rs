//! Transport layer for netbound: the [`AuthService`] contract, its request
//! and response bodies, and a reqwest-backed implementation.

pub mod http;
pub mod models;
pub mod service;

pub use http::{HttpClient, envelope_from_parts};
pub use models::{
    AuthResponse, GENERIC_AUTH_ERROR, LoginRequest, LoginResponse, RegistrationRequest,
    RegistrationResponse,
};
pub use service::{AuthService, HttpAuthService, LOGIN_PATH, REGISTER_PATH};
