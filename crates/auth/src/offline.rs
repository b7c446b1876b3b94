use std::sync::Arc;

use bridge::{
    account::{Account, AccountKind, AccountRef, AccountService, AccountVariant, AuthInfo, NewAccount},
    error::AccountError,
    executor::UiExecutor,
};
use uuid::Uuid;

/// Backend for offline accounts. Never talks to an authority, so logging in always succeeds.
#[derive(Debug, Default)]
pub struct OfflineAccountService;

impl OfflineAccountService {
    fn auth_info(account: &Account) -> AuthInfo {
        AuthInfo {
            username: account.character(),
            uuid: account.uuid(),
            access_token: account.uuid().simple().to_string().into(),
        }
    }
}

impl AccountService for OfflineAccountService {
    fn log_in(&self, account: &Account) -> Result<AuthInfo, AccountError> {
        if account.kind() != AccountKind::Offline {
            return Err(AccountError::Unsupported(account.kind()));
        }
        Ok(Self::auth_info(account))
    }

    fn play_offline(&self, account: &Account) -> Result<AuthInfo, AccountError> {
        self.log_in(account)
    }
}

pub fn offline_identifier(username: &str, uuid: Uuid) -> Arc<str> {
    format!("{username}:{}", uuid.simple()).into()
}

/// Creates an offline account whose character is `username`.
pub fn new_offline_account(
    username: &str,
    uuid: Uuid,
    portable: bool,
    executor: UiExecutor,
) -> AccountRef {
    log::debug!("Creating offline account {username} ({uuid})");
    Account::new(
        NewAccount {
            variant: AccountVariant::Offline,
            uuid,
            identifier: offline_identifier(username, uuid),
            username: Arc::from(""),
            character: username.into(),
            portable,
        },
        Arc::new(OfflineAccountService),
        executor,
    )
}
