use serde::{Deserialize, Serialize};

/// Profile row, keyed by the server's primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProperties {
    pub pk: i64,
    pub email: String,
    pub username: String,
}

impl AccountProperties {
    #[must_use]
    pub fn new(pk: i64, email: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            pk,
            email: email.into(),
            username: username.into(),
        }
    }
}

/// Credential row; `account_pk` references [`AccountProperties::pk`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub account_pk: i64,
    pub token: String,
}

impl AuthToken {
    #[must_use]
    pub fn new(account_pk: i64, token: impl Into<String>) -> Self {
        Self {
            account_pk,
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("account_pk", &self.account_pk)
            .field("token", &"[redacted]")
            .finish()
    }
}
