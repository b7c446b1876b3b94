use std::{collections::BTreeMap, fmt, path::Path, sync::Arc};

use enumset::{EnumSet, EnumSetType};
use parking_lot::Mutex;
use schema::profile::{CompleteGameProfile, MinecraftCape, Texture, TextureType};
use uuid::Uuid;

use crate::{
    error::AccountError,
    executor::UiExecutor,
    observable::{Binding, Observers, Property, Subscription},
};

pub type AccountRef = Arc<Account>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum AccountKind {
    Offline,
    Microsoft,
    AuthlibInjector,
    /// Legacy Mojang Yggdrasil accounts.
    Yggdrasil,
}

#[derive(Debug, EnumSetType)]
pub enum AccountCapability {
    UploadSkin,
    ChangeCape,
}

impl AccountKind {
    /// Capabilities known from the kind alone. Authlib-injector skin uploads additionally
    /// depend on the loaded profile, see [`Account::can_upload_skin`].
    pub fn capabilities(self) -> EnumSet<AccountCapability> {
        match self {
            AccountKind::Offline => EnumSet::only(AccountCapability::UploadSkin),
            AccountKind::Microsoft => AccountCapability::UploadSkin | AccountCapability::ChangeCape,
            AccountKind::AuthlibInjector => EnumSet::only(AccountCapability::UploadSkin),
            AccountKind::Yggdrasil => EnumSet::empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthInfo {
    pub username: Arc<str>,
    pub uuid: Uuid,
    pub access_token: Arc<str>,
}

/// A third party Yggdrasil-compatible authority.
pub struct AuthlibInjectorServer {
    url: Arc<str>,
    name: Property<Arc<str>>,
}

impl AuthlibInjectorServer {
    pub fn new(url: impl Into<Arc<str>>, name: impl Into<Arc<str>>, executor: UiExecutor) -> Arc<Self> {
        Arc::new(Self {
            url: url.into(),
            name: Property::new(name.into(), executor),
        })
    }

    pub fn name(&self) -> Arc<str> {
        self.name.get()
    }

    pub fn set_name(&self, name: impl Into<Arc<str>>) {
        self.name.set(name.into());
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.name.subscribe(listener)
    }
}

impl fmt::Debug for AuthlibInjectorServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthlibInjectorServer")
            .field("url", &self.url)
            .field("name", &self.name.get())
            .finish()
    }
}

/// Network side of an account. Implementations may block on I/O and are only called from
/// background threads.
pub trait AccountService: Send + Sync {
    /// Refreshes the session with stored credentials.
    ///
    /// Returns [`AccountError::CredentialExpired`] when the user has to enter a password again.
    fn log_in(&self, account: &Account) -> Result<AuthInfo, AccountError>;

    fn play_offline(&self, account: &Account) -> Result<AuthInfo, AccountError> {
        Err(AccountError::Unsupported(account.kind()))
    }

    fn clear_cache(&self, _account: &Account) {}

    fn upload_skin(&self, account: &Account, _is_slim: bool, _file: &Path) -> Result<(), AccountError> {
        Err(AccountError::Unsupported(account.kind()))
    }

    fn capes(&self, account: &Account) -> Result<Vec<MinecraftCape>, AccountError> {
        Err(AccountError::Unsupported(account.kind()))
    }

    fn change_cape(&self, account: &Account, _cape_id: &str) -> Result<(), AccountError> {
        Err(AccountError::Unsupported(account.kind()))
    }
}

#[derive(Debug, Clone)]
pub enum AccountVariant {
    Offline,
    Microsoft,
    AuthlibInjector { server: Arc<AuthlibInjectorServer> },
    Yggdrasil,
}

impl AccountVariant {
    pub fn kind(&self) -> AccountKind {
        match self {
            AccountVariant::Offline => AccountKind::Offline,
            AccountVariant::Microsoft => AccountKind::Microsoft,
            AccountVariant::AuthlibInjector { .. } => AccountKind::AuthlibInjector,
            AccountVariant::Yggdrasil => AccountKind::Yggdrasil,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub variant: AccountVariant,
    pub uuid: Uuid,
    pub identifier: Arc<str>,
    pub username: Arc<str>,
    pub character: Arc<str>,
    pub portable: bool,
}

pub struct Account {
    uuid: Uuid,
    identifier: Arc<str>,
    username: Arc<str>,
    character: Property<Arc<str>>,
    portable: Property<bool>,
    variant: AccountVariant,
    profile: Property<Option<Arc<CompleteGameProfile>>>,
    service: Arc<dyn AccountService>,
    refresh_lock: Mutex<()>,
    observers: Observers,
}

impl Account {
    pub fn new(new: NewAccount, service: Arc<dyn AccountService>, executor: UiExecutor) -> AccountRef {
        Arc::new(Self {
            uuid: new.uuid,
            identifier: new.identifier,
            username: new.username,
            character: Property::new(new.character, executor.clone()),
            portable: Property::new(new.portable, executor.clone()),
            variant: new.variant,
            profile: Property::new(None, executor.clone()),
            service,
            refresh_lock: Mutex::new(()),
            observers: Observers::new(executor),
        })
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn identifier(&self) -> &Arc<str> {
        &self.identifier
    }

    /// Name of the account owning the character. Empty for accounts without a login name.
    pub fn username(&self) -> &Arc<str> {
        &self.username
    }

    pub fn character(&self) -> Arc<str> {
        self.character.get()
    }

    pub fn set_character(&self, character: impl Into<Arc<str>>) {
        if self.character.set(character.into()) {
            self.invalidate();
        }
    }

    pub fn is_portable(&self) -> bool {
        self.portable.get()
    }

    pub fn set_portable(&self, portable: bool) {
        if self.portable.set(portable) {
            self.invalidate();
        }
    }

    pub fn kind(&self) -> AccountKind {
        self.variant.kind()
    }

    pub fn server(&self) -> Option<&Arc<AuthlibInjectorServer>> {
        match &self.variant {
            AccountVariant::AuthlibInjector { server } => Some(server),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<Arc<CompleteGameProfile>> {
        self.profile.get()
    }

    /// Called by services once the authority returned a fresh profile.
    pub fn set_profile(&self, profile: Option<CompleteGameProfile>) {
        if self.profile.set(profile.map(Arc::new)) {
            self.invalidate();
        }
    }

    pub fn textures(&self) -> Binding<Option<BTreeMap<TextureType, Texture>>> {
        self.profile.map(|profile| profile.as_ref().map(|profile| profile.textures.clone()))
    }

    pub fn executor(&self) -> &UiExecutor {
        self.observers.executor()
    }

    /// Serializes refreshes of this account across rows.
    pub fn refresh_lock(&self) -> &Mutex<()> {
        &self.refresh_lock
    }

    pub fn log_in(&self) -> Result<AuthInfo, AccountError> {
        self.service.log_in(self)
    }

    pub fn play_offline(&self) -> Result<AuthInfo, AccountError> {
        self.service.play_offline(self)
    }

    pub fn clear_cache(&self) {
        self.service.clear_cache(self)
    }

    pub fn can_upload_skin(&self) -> bool {
        match &self.variant {
            AccountVariant::AuthlibInjector { .. } => self.profile.with(skin_uploadable),
            _ => self.kind().capabilities().contains(AccountCapability::UploadSkin),
        }
    }

    /// Dynamic form of [`Account::can_upload_skin`]. For authlib-injector accounts it follows the
    /// loaded profile and stays false until one is loaded.
    pub fn can_upload_skin_observable(&self) -> Binding<bool> {
        match &self.variant {
            AccountVariant::AuthlibInjector { .. } => self.profile.map(skin_uploadable),
            _ => Binding::constant(self.can_upload_skin(), self.executor().clone()),
        }
    }

    /// Offline skins are edited locally, so this always fails for offline accounts.
    pub fn upload_skin(&self, is_slim: bool, file: &Path) -> Result<(), AccountError> {
        if self.kind() == AccountKind::Offline || !self.can_upload_skin() {
            return Err(AccountError::Unsupported(self.kind()));
        }
        self.service.upload_skin(self, is_slim, file)
    }

    pub fn can_change_cape(&self) -> bool {
        self.kind().capabilities().contains(AccountCapability::ChangeCape)
    }

    pub fn capes(&self) -> Result<Vec<MinecraftCape>, AccountError> {
        if !self.can_change_cape() {
            return Err(AccountError::Unsupported(self.kind()));
        }
        self.service.capes(self)
    }

    pub fn change_cape(&self, cape_id: &str) -> Result<(), AccountError> {
        if !self.can_change_cape() {
            return Err(AccountError::Unsupported(self.kind()));
        }
        self.service.change_cape(self, cape_id)
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.observers.subscribe(listener)
    }

    /// Notifies listeners that the account changed. Can be called from any thread, listeners
    /// always run on the UI executor.
    pub fn invalidate(&self) {
        self.observers.invalidate();
    }
}

fn skin_uploadable(profile: &Option<Arc<CompleteGameProfile>>) -> bool {
    profile
        .as_ref()
        .is_some_and(|profile| profile.uploadable_textures().contains(TextureType::Skin))
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account[kind={}, username={}, character={}, uuid={}, portable={}]",
            self.kind(),
            self.username,
            self.character(),
            self.uuid,
            self.is_portable()
        )
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("uuid", &self.uuid)
            .field("identifier", &self.identifier)
            .field("username", &self.username)
            .field("character", &self.character.get())
            .field("portable", &self.portable.get())
            .field("variant", &self.variant)
            .finish_non_exhaustive()
    }
}
