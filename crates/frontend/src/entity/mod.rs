use std::sync::Arc;

use schema::accounts_config::AccountsConfig;

use crate::{entity::account::AccountStore, login::InteractiveLogin, ui_host::UiHost};

pub mod account;

/// Shared state handed to every account row.
#[derive(Clone)]
pub struct DataEntities {
    pub accounts: Arc<AccountStore>,
    pub ui_host: Arc<dyn UiHost>,
    pub interactive_login: Arc<dyn InteractiveLogin>,
    pub config: Arc<AccountsConfig>,
}
