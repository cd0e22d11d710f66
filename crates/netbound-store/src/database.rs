//! Account and token tables, in memory or persisted as a JSON snapshot

use std::collections::BTreeMap;
use std::fs;
use std::sync::{Mutex, MutexGuard, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use netbound_utils::StorageError;
use netbound_utils::atomic_write::write_file_atomic;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dao::{AccountPropertiesDao, AuthTokenDao, INSERT_FAILED};
use crate::models::{AccountProperties, AuthToken};

/// File name of the snapshot inside the data directory
pub const DATABASE_FILE: &str = "netbound-db.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Tables {
    #[serde(default)]
    account_properties: BTreeMap<i64, AccountProperties>,
    #[serde(default)]
    auth_token: BTreeMap<i64, AuthToken>,
}

/// Local database implementing both DAOs.
///
/// Every mutation rewrites the snapshot atomically; a mutation whose snapshot
/// cannot be written is rolled back. Writes are serialized by one lock, which
/// makes each point write atomic on its own.
#[derive(Debug)]
pub struct LocalDatabase {
    path: Option<Utf8PathBuf>,
    tables: Mutex<Tables>,
}

impl LocalDatabase {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Open the snapshot at `path`, starting empty when it does not exist.
    pub fn open(path: impl Into<Utf8PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let tables = if path.exists() {
            let text = fs::read_to_string(&path).map_err(|e| StorageError::Open {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
            serde_json::from_str(&text).map_err(|e| StorageError::Open {
                path: path.to_string(),
                reason: e.to_string(),
            })?
        } else {
            Tables::default()
        };
        debug!(path = %path, accounts = tables.account_properties.len(), "Opened local database");

        Ok(Self {
            path: Some(path),
            tables: Mutex::new(tables),
        })
    }

    /// Open `<data_dir>/netbound-db.json`.
    pub fn open_in(data_dir: &Utf8Path) -> Result<Self, StorageError> {
        Self::open(data_dir.join(DATABASE_FILE))
    }

    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn account_count(&self) -> usize {
        self.lock().account_properties.len()
    }

    #[must_use]
    pub fn token_count(&self) -> usize {
        self.lock().auth_token.len()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, tables: &Tables) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let persist_error = |reason: String| StorageError::Persist {
            path: path.to_string(),
            reason,
        };
        let json = serde_json::to_vec_pretty(tables).map_err(|e| persist_error(e.to_string()))?;
        write_file_atomic(path, &json).map_err(|e| persist_error(format!("{e:#}")))?;
        Ok(())
    }
}

impl AccountPropertiesDao for LocalDatabase {
    fn insert_or_ignore(&self, account: &AccountProperties) -> i64 {
        let mut tables = self.lock();
        if tables.account_properties.contains_key(&account.pk) {
            return INSERT_FAILED;
        }
        tables
            .account_properties
            .insert(account.pk, account.clone());
        if let Err(e) = self.persist(&tables) {
            warn!(pk = account.pk, error = %e, "Account row not persisted");
            tables.account_properties.remove(&account.pk);
            return INSERT_FAILED;
        }
        account.pk
    }

    fn search_by_email(&self, email: &str) -> Option<AccountProperties> {
        self.lock()
            .account_properties
            .values()
            .find(|a| a.email == email)
            .cloned()
    }

    fn search_by_pk(&self, pk: i64) -> Option<AccountProperties> {
        self.lock().account_properties.get(&pk).cloned()
    }
}

impl AuthTokenDao for LocalDatabase {
    fn insert(&self, token: &AuthToken) -> i64 {
        let mut tables = self.lock();
        if !tables.account_properties.contains_key(&token.account_pk) {
            debug!(account_pk = token.account_pk, "Token rejected: no such account");
            return INSERT_FAILED;
        }
        let previous = tables.auth_token.insert(token.account_pk, token.clone());
        if let Err(e) = self.persist(&tables) {
            warn!(account_pk = token.account_pk, error = %e, "Token row not persisted");
            match previous {
                Some(previous) => tables.auth_token.insert(token.account_pk, previous),
                None => tables.auth_token.remove(&token.account_pk),
            };
            return INSERT_FAILED;
        }
        token.account_pk
    }

    fn search_by_pk(&self, account_pk: i64) -> Option<AuthToken> {
        self.lock().auth_token.get(&account_pk).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_or_ignore_keeps_first_row() {
        let db = LocalDatabase::in_memory();
        assert_eq!(db.insert_or_ignore(&AccountProperties::new(1, "a@b.com", "")), 1);
        assert_eq!(
            db.insert_or_ignore(&AccountProperties::new(1, "other@b.com", "x")),
            INSERT_FAILED
        );
        assert_eq!(
            AccountPropertiesDao::search_by_pk(&db, 1).map(|a| a.email),
            Some("a@b.com".to_string())
        );
    }

    #[test]
    fn test_token_requires_account() {
        let db = LocalDatabase::in_memory();
        assert!(db.insert(&AuthToken::new(9, "T")) < 0);
        assert_eq!(db.token_count(), 0);

        db.insert_or_ignore(&AccountProperties::new(9, "a@b.com", ""));
        assert_eq!(db.insert(&AuthToken::new(9, "T")), 9);
        assert_eq!(db.insert(&AuthToken::new(9, "T2")), 9);
        assert_eq!(
            AuthTokenDao::search_by_pk(&db, 9).map(|t| t.token),
            Some("T2".to_string())
        );
    }

    #[test]
    fn test_search_by_email() {
        let db = LocalDatabase::in_memory();
        db.insert_or_ignore(&AccountProperties::new(1, "a@b.com", ""));
        db.insert_or_ignore(&AccountProperties::new(2, "c@d.com", "cd"));
        assert_eq!(db.search_by_email("c@d.com").map(|a| a.pk), Some(2));
        assert!(db.search_by_email("missing@d.com").is_none());
    }

    #[test]
    fn test_token_debug_is_redacted() {
        let debug = format!("{:?}", AuthToken::new(1, "secret-token"));
        assert!(!debug.contains("secret-token"));
    }
}
