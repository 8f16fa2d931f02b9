//
//  bitbucket-ide
//  auth/keyring.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Secure Credential Storage Module
//!
//! [`CredentialStore`] backed by the system's native keyring/keychain
//! service.
//!
//! ## Platform Support
//!
//! - **macOS**: Keychain Services
//! - **Linux**: Secret Service API (GNOME Keyring, KWallet)
//! - **Windows**: Windows Credential Manager
//!
//! ## Storage Model
//!
//! Entries are keyed by service name (`bitbucket-ide`) and the account's
//! stable identifier, never its login, so renaming an account does not
//! orphan its secret.
//!
//! Keyring failures are logged and read as an absent secret; the caller
//! surfaces the resulting missing-token condition through its own error
//! path.

use keyring::Entry;
use tracing::warn;

use crate::auth::{AccountId, CredentialStore};
use crate::APP_NAME;

/// Credential store over the platform's native keyring service.
///
/// # Notes
///
/// - The keyring may require user interaction (password, biometrics) on
///   first access.
/// - Entries persist across application restarts and system reboots.
/// - On Linux, a secret service daemon (GNOME Keyring, KWallet) must be
///   running.
pub struct KeyringStore {
    service: String,
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringStore {
    /// Creates a store using the application's default service name.
    ///
    /// No keyring access occurs during construction; the keyring is touched
    /// only when secrets are read or written.
    pub fn new() -> Self {
        Self {
            service: APP_NAME.to_string(),
        }
    }

    fn entry(&self, id: &AccountId) -> Result<Entry, keyring::Error> {
        Entry::new(&self.service, id.as_str())
    }
}

impl CredentialStore for KeyringStore {
    fn get_secret(&self, id: &AccountId) -> Option<String> {
        let entry = match self.entry(id) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(account = %id, error = %e, "keyring entry unavailable");
                return None;
            }
        };
        match entry.get_password() {
            Ok(secret) => Some(secret),
            Err(keyring::Error::NoEntry) => None,
            Err(e) => {
                warn!(account = %id, error = %e, "keyring read failed");
                None
            }
        }
    }

    fn set_secret(&self, id: &AccountId, secret: Option<String>) {
        let entry = match self.entry(id) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(account = %id, error = %e, "keyring entry unavailable");
                return;
            }
        };
        let result = match secret {
            Some(value) => entry.set_password(&value),
            // Idempotent removal: a missing entry is already the goal state.
            None => match entry.delete_credential() {
                Err(keyring::Error::NoEntry) => Ok(()),
                other => other,
            },
        };
        if let Err(e) = result {
            warn!(account = %id, error = %e, "keyring write failed");
        }
    }
}
