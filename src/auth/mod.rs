//
//  bitbucket-ide
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Account and Credential Model
//!
//! Identity types for the accounts the plugin talks to, and the
//! [`CredentialStore`] seam through which secrets are read. The API layer
//! never persists secrets itself; it consults the store at executor-creation
//! time and reacts to change notifications from the owning component.
//!
//! ## Module Structure
//!
//! - [`keyring`]: [`CredentialStore`] backed by the platform's native
//!   keychain service.
//!
//! ## Example
//!
//! ```rust
//! use bitbucket_ide::auth::{Account, AccountId, CredentialStore, InMemoryCredentialStore};
//!
//! let store = InMemoryCredentialStore::default();
//! let id = AccountId::new("a1b2c3");
//! store.set_secret(&id, Some("app-password".to_string()));
//!
//! assert_eq!(store.get_secret(&id).as_deref(), Some("app-password"));
//! ```

mod keyring;

pub use keyring::KeyringStore;

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Opaque, stable identifier of a stored account.
///
/// The identifier survives renames of the account's login, so it is the key
/// for both credential lookup and executor caching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Bitbucket account known to the plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    login: String,
    host: String,
}

impl Account {
    pub fn new(id: AccountId, login: String, host: String) -> Self {
        Self { id, login, host }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.login, self.host)
    }
}

/// Read/write access to per-account secrets.
///
/// Lookups are infallible from the caller's perspective: a backend failure
/// reads the same as an absent secret, and the implementation is expected to
/// log the underlying cause.
pub trait CredentialStore: Send + Sync {
    /// Returns the secret stored for `id`, if any.
    fn get_secret(&self, id: &AccountId) -> Option<String>;

    /// Stores or removes the secret for `id`.
    fn set_secret(&self, id: &AccountId, secret: Option<String>);
}

/// Process-local credential store.
///
/// Used in tests and as a fallback where no platform keychain is available.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    secrets: Mutex<HashMap<AccountId, String>>,
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_secret(&self, id: &AccountId) -> Option<String> {
        self.secrets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(id)
            .cloned()
    }

    fn set_secret(&self, id: &AccountId, secret: Option<String>) {
        let mut secrets = self.secrets.lock().unwrap_or_else(|e| e.into_inner());
        match secret {
            Some(value) => {
                secrets.insert(id.clone(), value);
            }
            None => {
                secrets.remove(id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_round_trips_and_removes() {
        let store = InMemoryCredentialStore::default();
        let id = AccountId::new("acc-1");

        assert_eq!(store.get_secret(&id), None);

        store.set_secret(&id, Some("secret".to_string()));
        assert_eq!(store.get_secret(&id).as_deref(), Some("secret"));

        store.set_secret(&id, None);
        assert_eq!(store.get_secret(&id), None);
    }

    #[test]
    fn account_displays_login_and_host() {
        let account = Account::new(
            AccountId::new("acc-1"),
            "dev".to_string(),
            "bitbucket.org".to_string(),
        );
        assert_eq!(account.to_string(), "dev@bitbucket.org");
    }
}
