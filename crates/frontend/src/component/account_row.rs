use std::{
    path::Path,
    sync::{Arc, Weak},
};

use bridge::{
    account::{Account, AccountKind, AccountRef},
    error::AccountError,
    observable::{Binding, Property, Subscription},
    task::AsyncTask,
};
use futures::channel::oneshot;
use parking_lot::Mutex;
use rust_i18n::t;
use schema::profile::MinecraftCape;

use crate::{
    entity::{
        DataEntities,
        account::{AccountStore, kind_name},
    },
    login::InteractiveLogin,
    skin::NormalizedSkin,
    ui_host::{ConfirmContent, FileFilter, MessageType, UiHost},
};

/// One row of the account list.
///
/// Must be created and used on the UI executor. Tasks returned by the actions run their
/// network stages on the blocking pool and report failures through [`UiHost`] dialogs. Those
/// tasks keep running after the row is dropped, but never touch its properties again.
pub struct AccountRowController {
    account: AccountRef,
    accounts: Arc<AccountStore>,
    ui_host: Arc<dyn UiHost>,
    refresher: Refresher,
    display: Arc<RowDisplay>,
    _subscriptions: Vec<Subscription>,
}

struct RowDisplay {
    title: Property<Arc<str>>,
    subtitle: Property<Arc<str>>,
}

impl RowDisplay {
    fn update(&self, account: &Account) {
        self.title.set(display_title(account));
        self.subtitle.set(display_subtitle(account));
    }
}

pub fn display_title(account: &Account) -> Arc<str> {
    if account.kind() == AccountKind::Offline || account.username().is_empty() {
        account.character()
    } else {
        format!("{} - {}", account.username(), account.character()).into()
    }
}

pub fn display_subtitle(account: &Account) -> Arc<str> {
    subtitle_in(account, &rust_i18n::locale())
}

/// Every segment is looked up in `locale`, so a locale switch never leaves a mixed subtitle.
fn subtitle_in(account: &Account, locale: &str) -> Arc<str> {
    let mut subtitle = kind_name(account.kind(), locale).to_string();
    if let Some(server) = account.server() {
        let label = t!("account.injector.server", locale = locale);
        subtitle.push_str(&format!(", {label}: {}", server.name()));
    }
    if account.is_portable() {
        subtitle.push_str(&format!(", {}", t!("account.portable", locale = locale)));
    }
    subtitle.into()
}

impl AccountRowController {
    pub fn new(account: AccountRef, data: &DataEntities) -> Self {
        let executor = data.ui_host.ui_executor().clone();
        let display = Arc::new(RowDisplay {
            title: Property::new(display_title(&account), executor.clone()),
            subtitle: Property::new(display_subtitle(&account), executor),
        });

        let mut subscriptions = vec![account.subscribe(display_listener(&account, &display))];
        if let Some(server) = account.server() {
            subscriptions.push(server.subscribe(display_listener(&account, &display)));
        }
        log::debug!("Attached row for {account}");

        Self {
            refresher: Refresher {
                account: account.clone(),
                login: data.interactive_login.clone(),
                serialize: data.config.serialize_refresh,
            },
            account,
            accounts: data.accounts.clone(),
            ui_host: data.ui_host.clone(),
            display,
            _subscriptions: subscriptions,
        }
    }

    pub fn account(&self) -> &AccountRef {
        &self.account
    }

    pub fn title(&self) -> Arc<str> {
        self.display.title.get()
    }

    pub fn title_property(&self) -> &Property<Arc<str>> {
        &self.display.title
    }

    pub fn subtitle(&self) -> Arc<str> {
        self.display.subtitle.get()
    }

    pub fn subtitle_property(&self) -> &Property<Arc<str>> {
        &self.display.subtitle
    }

    /// Clears the session and logs in again, asking for a password if the stored token expired.
    pub fn refresh_async(&self) -> AsyncTask {
        self.refresher.task()
    }

    pub fn can_upload_skin(&self) -> Binding<bool> {
        self.account.can_upload_skin_observable()
    }

    pub fn can_change_cape(&self) -> Binding<bool> {
        Binding::constant(self.account.can_change_cape(), self.ui_host.ui_executor().clone())
    }

    /// Returns `None` when there is nothing to run: offline accounts get the local skin editor,
    /// and the picker may be dismissed.
    pub fn upload_skin(&self) -> Option<AsyncTask> {
        if self.account.kind() == AccountKind::Offline {
            self.ui_host.open_offline_skin_editor(&self.account);
            return None;
        }
        if !self.account.can_upload_skin() {
            return None;
        }

        let path = self
            .ui_host
            .pick_file(&t!("account.skin.upload"), &[FileFilter::png(t!("account.skin.file"))])?;

        let account = self.account.clone();
        let refresher = self.refresher.clone();
        let ui_host = self.ui_host.clone();
        let accounts = self.accounts.clone();
        let task = self
            .refresher
            .task()
            .then_run_async(move |()| upload_skin_file(&account, &path))
            .then_compose_async(move |()| refresher.task())
            .when_complete(self.ui_host.ui_executor(), move |error| {
                if let Some(error) = error {
                    ui_host.dialog(
                        &accounts.localize_error(error),
                        Some(&*t!("account.skin.upload_failed")),
                        MessageType::Error,
                    );
                }
            });
        Some(task)
    }

    pub fn change_cape(&self) -> Option<AsyncTask> {
        if !self.account.can_change_cape() {
            return None;
        }

        let account = self.account.clone();
        let refresher = self.refresher.clone();
        let stage_host = self.ui_host.clone();
        let stage_accounts = self.accounts.clone();
        let ui_host = self.ui_host.clone();
        let accounts = self.accounts.clone();
        let task = self
            .refresher
            .task()
            .then_run_async(move |()| choose_and_change_cape(&account, &stage_host, &stage_accounts))
            .then_compose_async(move |()| refresher.task())
            .when_complete(self.ui_host.ui_executor(), move |error| {
                if let Some(error) = error {
                    ui_host.dialog(
                        &accounts.localize_error(error),
                        Some(&*t!("account.cape.change_failed")),
                        MessageType::Error,
                    );
                }
            });
        Some(task)
    }

    /// Removes the account from the store. Returns false if it was already gone.
    pub fn remove(&self) -> bool {
        self.accounts.remove(&self.account)
    }
}

impl Drop for AccountRowController {
    fn drop(&mut self) {
        log::debug!("Detached row for {}", self.account);
    }
}

fn display_listener(
    account: &AccountRef,
    display: &Arc<RowDisplay>,
) -> impl Fn() + Send + Sync + 'static {
    let account = Arc::downgrade(account);
    let display: Weak<RowDisplay> = Arc::downgrade(display);
    move || {
        let (Some(account), Some(display)) = (account.upgrade(), display.upgrade()) else {
            return;
        };
        display.update(&account);
    }
}

#[derive(Clone)]
struct Refresher {
    account: AccountRef,
    login: Arc<dyn InteractiveLogin>,
    serialize: bool,
}

impl Refresher {
    fn task(&self) -> AsyncTask {
        let refresher = self.clone();
        AsyncTask::run_async(move || refresher.refresh())
    }

    fn refresh(&self) -> Result<(), AccountError> {
        let _guard = self.serialize.then(|| self.account.refresh_lock().lock());

        self.account.clear_cache();
        match self.account.log_in() {
            Ok(_) => Ok(()),
            Err(AccountError::CredentialExpired) => match self.login.prompt_login(&self.account) {
                Ok(()) | Err(AccountError::Cancelled) => Ok(()),
                Err(error) => {
                    log::warn!("Failed to refresh {} with password: {error}", self.account);
                    Err(error)
                },
            },
            Err(error) => {
                log::warn!("Failed to refresh {} with token: {error}", self.account);
                Err(error)
            },
        }
    }
}

fn upload_skin_file(account: &Account, path: &Path) -> Result<(), AccountError> {
    let skin = NormalizedSkin::read_png(path)?;
    let model = if skin.is_slim() { "slim" } else { "" };
    log::info!("Uploading skin [{}], model [{model}]", path.display());
    account.upload_skin(skin.is_slim(), path)
}

fn choose_and_change_cape(
    account: &AccountRef,
    ui_host: &Arc<dyn UiHost>,
    accounts: &Arc<AccountStore>,
) -> Result<(), AccountError> {
    let capes = account.capes()?;
    let executor = ui_host.ui_executor();

    if capes.is_empty() {
        let ui_host = ui_host.clone();
        executor.execute(move || ui_host.dialog(&t!("account.cape.none"), None, MessageType::Info));
        return Ok(());
    }

    let Some(cape) = prompt_cape_selection(ui_host, &capes).and_then(|index| capes.get(index)) else {
        return Ok(());
    };

    match account.change_cape(&cape.id) {
        Ok(()) => {
            log::info!("Changed cape of {account} to {}", cape.alias);
            let ui_host = ui_host.clone();
            executor.execute(move || ui_host.toast(&t!("account.cape.change_success")));
        },
        Err(error) if error.is_cancellation() => {},
        Err(error) => {
            log::warn!("Failed to change cape of {account}: {error}");
            let message = accounts.localize_error(&error);
            let ui_host = ui_host.clone();
            executor.execute(move || {
                ui_host.dialog(&message, Some(&*t!("account.cape.change_failed")), MessageType::Error)
            });
        },
    }
    Ok(())
}

/// Shows the cape list on the UI executor and blocks until the user answers.
fn prompt_cape_selection(ui_host: &Arc<dyn UiHost>, capes: &[MinecraftCape]) -> Option<usize> {
    let (sender, receiver) = oneshot::channel();
    let sender = Arc::new(Mutex::new(Some(sender)));
    let options: Arc<[Arc<str>]> = capes.iter().map(|cape| cape.alias.clone()).collect();

    let host = ui_host.clone();
    ui_host.ui_executor().execute(move || {
        let on_ok = {
            let sender = sender.clone();
            Box::new(move |selected: Option<usize>| {
                if let Some(sender) = sender.lock().take() {
                    let _ = sender.send(selected);
                }
            })
        };
        let on_cancel = Box::new(move || {
            if let Some(sender) = sender.lock().take() {
                let _ = sender.send(None);
            }
        });
        let content = ConfirmContent::SingleSelect {
            title: t!("account.cape.change").into(),
            options,
        };
        host.confirm(content, on_ok, on_cancel);
    });

    // A dialog dropped without an answer counts as cancelled.
    futures::executor::block_on(receiver).ok().flatten()
}
