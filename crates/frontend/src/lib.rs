rust_i18n::i18n!("locales", fallback = "en");

pub mod component;
pub mod config;
pub mod entity;
pub mod login;
pub mod skin;
pub mod ui_host;
