//! Auth repository built on network-bound resources.
//!
//! Field validation runs before any request starts. Successful responses are
//! persisted (account row, then token row) and the authenticated email is
//! remembered so a later [`AuthRepository::check_previous_auth_user`] can
//! resume the session offline.

pub mod repository;
pub mod state;
pub mod validation;

pub use repository::{AuthRepository, ERROR_SAVE_AUTH_TOKEN, RESPONSE_CHECK_PREVIOUS_AUTH_USER_DONE};
pub use state::AuthViewState;
pub use validation::{
    ERROR_LOGIN_FIELDS, ERROR_PASSWORDS_MUST_MATCH, ERROR_REGISTRATION_FIELDS, LoginFields,
    RegistrationFields, ValidationVerdict,
};
