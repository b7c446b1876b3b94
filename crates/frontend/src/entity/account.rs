use std::sync::Arc;

use bridge::{
    account::{AccountKind, AccountRef},
    error::AccountError,
    executor::UiExecutor,
    observable::{Observers, Subscription},
};
use indexmap::IndexMap;
use parking_lot::RwLock;
use rust_i18n::t;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AccountKey {
    kind: AccountKind,
    identifier: Arc<str>,
}

impl AccountKey {
    fn of(account: &AccountRef) -> Self {
        Self {
            kind: account.kind(),
            identifier: account.identifier().clone(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum AccountStoreError {
    #[error("A {kind} account with identifier {identifier} already exists")]
    Duplicate { kind: AccountKind, identifier: Arc<str> },
}

/// Ordered list of the saved accounts, unique by kind and identifier.
pub struct AccountStore {
    entries: RwLock<IndexMap<AccountKey, AccountRef>>,
    observers: Observers,
}

impl AccountStore {
    pub fn new(executor: UiExecutor) -> Self {
        Self {
            entries: RwLock::new(IndexMap::new()),
            observers: Observers::new(executor),
        }
    }

    pub fn add(&self, account: AccountRef) -> Result<(), AccountStoreError> {
        let key = AccountKey::of(&account);
        {
            let mut entries = self.entries.write();
            if entries.contains_key(&key) {
                return Err(AccountStoreError::Duplicate {
                    kind: key.kind,
                    identifier: key.identifier,
                });
            }
            log::debug!("Adding {account}");
            entries.insert(key, account);
        }
        self.observers.invalidate();
        Ok(())
    }

    pub fn list(&self) -> Vec<AccountRef> {
        self.entries.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn contains(&self, account: &AccountRef) -> bool {
        self.entries
            .read()
            .get(&AccountKey::of(account))
            .is_some_and(|entry| Arc::ptr_eq(entry, account))
    }

    /// Removes `account` by identity. Returns false if this exact handle is not stored.
    pub fn remove(&self, account: &AccountRef) -> bool {
        {
            let mut entries = self.entries.write();
            let key = AccountKey::of(account);
            let Some(entry) = entries.get(&key) else {
                return false;
            };
            if !Arc::ptr_eq(entry, account) {
                return false;
            }
            entries.shift_remove(&key);
        }
        log::debug!("Removed {account}");
        self.observers.invalidate();
        true
    }

    /// Notified on the UI executor whenever accounts are added or removed.
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.observers.subscribe(listener)
    }

    pub fn localized_kind_name(&self, kind: AccountKind) -> Arc<str> {
        kind_name(kind, &rust_i18n::locale())
    }

    pub fn localize_error(&self, error: &AccountError) -> String {
        match error {
            AccountError::CredentialExpired => t!("account.failed.credential_expired").to_string(),
            AccountError::Cancelled => t!("message.cancelled").to_string(),
            AccountError::AuthenticationFailure(message) => {
                t!("account.failed.authentication", message = message).to_string()
            },
            // Capability checks should prevent this, so it reads as a failed login.
            AccountError::Unsupported(kind) => {
                let reason = t!("account.failed.unsupported", kind = self.localized_kind_name(*kind));
                t!("account.failed.authentication", message = reason).to_string()
            },
            AccountError::InvalidSkin(error) => format!("{}\n{error}", t!("account.skin.invalid_skin")),
            AccountError::Interrupted => t!("account.failed.interrupted").to_string(),
        }
    }
}

pub fn kind_name(kind: AccountKind, locale: &str) -> Arc<str> {
    match kind {
        AccountKind::Offline => t!("account.methods.offline", locale = locale),
        AccountKind::Microsoft => t!("account.methods.microsoft", locale = locale),
        AccountKind::AuthlibInjector => t!("account.methods.authlib_injector", locale = locale),
        AccountKind::Yggdrasil => t!("account.methods.yggdrasil", locale = locale),
    }
    .into()
}
