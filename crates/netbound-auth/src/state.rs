use netbound_store::AuthToken;

/// What the auth screens render: the credential, once there is one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthViewState {
    pub auth_token: Option<AuthToken>,
}

impl AuthViewState {
    #[must_use]
    pub fn authenticated(token: AuthToken) -> Self {
        Self {
            auth_token: Some(token),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.auth_token.is_some()
    }

    #[must_use]
    pub fn account_pk(&self) -> Option<i64> {
        self.auth_token.as_ref().map(|t| t.account_pk)
    }
}
