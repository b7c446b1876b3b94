use std::sync::Arc;

use crate::{account::AccountKind, executor::ExecutorClosed};

#[derive(thiserror::Error, Debug)]
pub enum AccountError {
    #[error("Stored credentials have expired, a password login is required")]
    CredentialExpired,
    #[error("Operation was cancelled by the user")]
    Cancelled,
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(Arc<str>),
    #[error("Operation is not supported by {0} accounts")]
    Unsupported(AccountKind),
    #[error("Invalid skin: {0}")]
    InvalidSkin(#[from] InvalidSkinError),
    #[error("Background task was interrupted")]
    Interrupted,
}

impl AccountError {
    pub fn authentication(message: impl Into<Arc<str>>) -> Self {
        Self::AuthenticationFailure(message.into())
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<ExecutorClosed> for AccountError {
    fn from(_: ExecutorClosed) -> Self {
        Self::Interrupted
    }
}

#[derive(thiserror::Error, Debug)]
pub enum InvalidSkinError {
    #[error("Failed to read skin image")]
    Read(#[source] std::io::Error),
    #[error("Failed to decode skin image: {0}")]
    Decode(Arc<str>),
    #[error("Skins must be 64x64 or 64x32, got {width}x{height}")]
    Dimensions { width: u32, height: u32 },
}
