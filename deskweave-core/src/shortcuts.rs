//! Global (system-wide) keyboard shortcut contract.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;

/// Callback fired when a registered shortcut is pressed.
pub type ShortcutCallback = Arc<dyn Fn() + Send + Sync>;

/// Registration of system-wide hotkeys such as `"CmdOrCtrl+Shift+K"`.
pub trait GlobalShortcutManager: Send + Sync {
    fn register(
        &self,
        shortcut: &str,
        callback: ShortcutCallback,
    ) -> impl Future<Output = Result<()>> + Send;

    fn is_registered(&self, shortcut: &str) -> impl Future<Output = Result<bool>> + Send;

    fn unregister(&self, shortcut: &str) -> impl Future<Output = Result<()>> + Send;

    fn unregister_all(&self) -> impl Future<Output = Result<()>> + Send;
}
