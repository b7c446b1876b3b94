use std::{path::PathBuf, sync::Arc};

use bridge::{account::AccountRef, executor::UiExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFilter {
    pub description: Arc<str>,
    pub extensions: Arc<[Arc<str>]>,
}

impl FileFilter {
    pub fn png(description: impl Into<Arc<str>>) -> Self {
        Self {
            description: description.into(),
            extensions: Arc::from([Arc::from("png")]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmContent {
    /// A list where the user picks at most one option.
    SingleSelect {
        title: Arc<str>,
        options: Arc<[Arc<str>]>,
    },
}

/// Receives the index of the selected option, `None` if nothing was selected.
pub type ConfirmCallback = Box<dyn FnOnce(Option<usize>) + Send>;
pub type CancelCallback = Box<dyn FnOnce() + Send>;

/// Window-level services used by account rows.
///
/// Every method except [`UiHost::ui_executor`] must be called on the UI executor.
pub trait UiHost: Send + Sync {
    fn ui_executor(&self) -> &UiExecutor;

    /// Modal single file chooser. `None` when the user closed it without choosing.
    fn pick_file(&self, title: &str, filters: &[FileFilter]) -> Option<PathBuf>;

    /// Shows `content` with OK / Cancel buttons. Exactly one of the callbacks is expected to be
    /// called; if the dialog is discarded without either, the caller treats it as cancelled.
    fn confirm(&self, content: ConfirmContent, on_ok: ConfirmCallback, on_cancel: CancelCallback);

    fn dialog(&self, text: &str, title: Option<&str>, message_type: MessageType);

    fn toast(&self, text: &str);

    /// Offline skins are picked locally instead of uploaded.
    fn open_offline_skin_editor(&self, account: &AccountRef);
}
