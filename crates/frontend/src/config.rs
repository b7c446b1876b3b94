use std::path::Path;

use schema::accounts_config::AccountsConfig;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("An I/O error occured while trying to read the config")]
    IoError(#[from] std::io::Error),
    #[error("A serialization error occured while trying to read the config")]
    SerdeError(#[from] serde_json::Error),
}

/// Reads the accounts config. A missing file yields the defaults.
pub fn load_accounts_config(path: &Path) -> Result<AccountsConfig, ConfigError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("No accounts config at {}, using defaults", path.display());
            return Ok(AccountsConfig::default());
        },
        Err(error) => return Err(error.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn apply_locale(config: &AccountsConfig) {
    if let Some(locale) = &config.locale {
        log::info!("Switching UI locale to {locale}");
        rust_i18n::set_locale(locale);
    }
}
