//
//  bitbucket-ide
//  api/manager.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/20.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Executor Manager
//!
//! Per-account cache of [`TokenAuthExecutor`] instances. Components that
//! talk to the same account share one executor, so a token rotation is
//! visible everywhere at once instead of leaving stale clients behind.
//!
//! Secrets live in the injected [`CredentialStore`]; the manager only reads
//! them at executor-creation time and reacts to change notifications.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::api::common::ApiError;
use crate::api::executor::{RequestExecutorFactory, TokenAuthExecutor};
use crate::auth::{Account, AccountId, CredentialStore};

/// Caches one token executor per account.
pub struct RequestExecutorManager<S: CredentialStore> {
    store: S,
    factory: RequestExecutorFactory,
    executors: Mutex<HashMap<AccountId, Arc<TokenAuthExecutor>>>,
}

impl<S: CredentialStore> RequestExecutorManager<S> {
    /// Builds a manager over a credential store and an executor factory.
    pub fn new(store: S, factory: RequestExecutorFactory) -> Self {
        Self {
            store,
            factory,
            executors: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the shared executor for `account`, creating it on first use.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingToken`] when the store has no secret for the
    /// account; the cache is left untouched so a later call can succeed
    /// once the secret appears.
    pub fn get_executor(&self, account: &Account) -> Result<Arc<TokenAuthExecutor>, ApiError> {
        self.executor_with(account, || self.store.get_secret(account.id()))
    }

    /// Like [`RequestExecutorManager::get_executor`], but consults
    /// `missing_token_handler` when the store has no secret. The handler may
    /// obtain one out of band (for example by prompting); returning `None`
    /// keeps the missing-token failure.
    pub fn get_executor_or(
        &self,
        account: &Account,
        missing_token_handler: impl FnOnce() -> Option<String>,
    ) -> Result<Arc<TokenAuthExecutor>, ApiError> {
        self.executor_with(account, || {
            self.store
                .get_secret(account.id())
                .or_else(missing_token_handler)
        })
    }

    /// Reacts to a secret change for `account`.
    ///
    /// A removed secret evicts the cached executor; an updated secret is
    /// pushed into the cached executor in place so existing references keep
    /// working and their listeners fire.
    pub fn secret_changed(&self, account: &Account) {
        let mut executors = self.executors.lock().unwrap_or_else(|e| e.into_inner());
        match self.store.get_secret(account.id()) {
            None => {
                if executors.remove(account.id()).is_some() {
                    debug!(account = %account.id(), "executor evicted: secret removed");
                }
            }
            Some(token) => {
                if let Some(executor) = executors.get(account.id()) {
                    executor.set_token(token);
                    debug!(account = %account.id(), "executor updated: secret rotated");
                }
            }
        }
    }

    fn executor_with(
        &self,
        account: &Account,
        secret: impl FnOnce() -> Option<String>,
    ) -> Result<Arc<TokenAuthExecutor>, ApiError> {
        let mut executors = self.executors.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(existing) = executors.get(account.id()) {
            return Ok(existing.clone());
        }
        let token = secret().ok_or_else(|| ApiError::MissingToken(account.to_string()))?;
        let executor = Arc::new(self.factory.create(token)?);
        executors.insert(account.id().clone(), executor.clone());
        debug!(account = %account.id(), "executor created");
        Ok(executor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::settings::ApiSettings;
    use crate::auth::InMemoryCredentialStore;

    fn manager(store: InMemoryCredentialStore) -> RequestExecutorManager<InMemoryCredentialStore> {
        RequestExecutorManager::new(store, RequestExecutorFactory::new(ApiSettings::default()))
    }

    fn account(name: &str) -> Account {
        Account::new(AccountId::new(name), name.to_string(), "bitbucket.org".to_string())
    }

    #[test]
    fn missing_secret_is_a_missing_token_error() {
        let manager = manager(InMemoryCredentialStore::default());
        let result = manager.get_executor(&account("ghost"));
        assert!(matches!(result, Err(ApiError::MissingToken(_))));
    }

    #[test]
    fn executor_is_cached_per_account() {
        let store = InMemoryCredentialStore::default();
        store.set_secret(&AccountId::new("dev"), Some("s3cret".to_string()));
        let manager = manager(store);

        let account = account("dev");
        let first = manager.get_executor(&account).unwrap();
        let second = manager.get_executor(&account).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn missing_token_handler_supplies_the_secret() {
        let manager = manager(InMemoryCredentialStore::default());
        let executor = manager.get_executor_or(&account("dev"), || Some("fresh".to_string()));
        assert!(executor.is_ok());
    }

    #[test]
    fn removed_secret_evicts_cached_executor() {
        let store = InMemoryCredentialStore::default();
        let id = AccountId::new("dev");
        store.set_secret(&id, Some("s3cret".to_string()));
        let manager = manager(store);

        let account = account("dev");
        let first = manager.get_executor(&account).unwrap();

        manager.store.set_secret(&id, None);
        manager.secret_changed(&account);

        assert!(matches!(
            manager.get_executor(&account),
            Err(ApiError::MissingToken(_))
        ));
        drop(first);
    }

    #[test]
    fn rotated_secret_updates_executor_in_place() {
        let store = InMemoryCredentialStore::default();
        let id = AccountId::new("dev");
        store.set_secret(&id, Some("old".to_string()));
        let manager = manager(store);

        let account = account("dev");
        let executor = manager.get_executor(&account).unwrap();

        let fired = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
        let observed = fired.clone();
        executor.subscribe_auth_data_changed(move || {
            observed.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        manager.store.set_secret(&id, Some("new".to_string()));
        manager.secret_changed(&account);
        assert!(fired.load(std::sync::atomic::Ordering::SeqCst));

        // Same instance is still served.
        let again = manager.get_executor(&account).unwrap();
        assert!(Arc::ptr_eq(&executor, &again));
    }
}
