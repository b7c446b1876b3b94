use bridge::{account::AccountRef, error::AccountError};

/// Asks the user to log in again when stored credentials no longer work.
pub trait InteractiveLogin: Send + Sync {
    /// Blocks the calling background thread until the user finishes.
    ///
    /// Returns [`AccountError::Cancelled`] when the user dismissed the prompt.
    fn prompt_login(&self, account: &AccountRef) -> Result<(), AccountError>;
}
