//! Storage contract consumed by the auth repository

use crate::models::{AccountProperties, AuthToken};

/// Returned by inserts that did not store anything
pub const INSERT_FAILED: i64 = -1;

pub trait AccountPropertiesDao: Send + Sync {
    /// Insert unless a row with the same `pk` exists.
    ///
    /// Returns the row id, or [`INSERT_FAILED`] when the row was ignored.
    /// Never fails otherwise.
    fn insert_or_ignore(&self, account: &AccountProperties) -> i64;

    fn search_by_email(&self, email: &str) -> Option<AccountProperties>;

    fn search_by_pk(&self, pk: i64) -> Option<AccountProperties>;
}

pub trait AuthTokenDao: Send + Sync {
    /// Insert or replace the token of `token.account_pk`.
    ///
    /// Returns a non-negative row id, or a negative sentinel when the
    /// referenced account does not exist or the write could not be persisted.
    fn insert(&self, token: &AuthToken) -> i64;

    fn search_by_pk(&self, account_pk: i64) -> Option<AuthToken>;
}
