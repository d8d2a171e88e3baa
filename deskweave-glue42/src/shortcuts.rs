//! [`GlobalShortcutManager`] over the Glue42 `hotkeys` API.

use deskweave_core::{GlobalShortcutManager, Result, ShortcutCallback};

use crate::driver::GdHotkeys;

pub struct Glue42GlobalShortcutManager<H: GdHotkeys> {
    hotkeys: H,
}

impl<H: GdHotkeys> Glue42GlobalShortcutManager<H> {
    pub fn new(hotkeys: H) -> Self {
        Self { hotkeys }
    }
}

impl<H: GdHotkeys> GlobalShortcutManager for Glue42GlobalShortcutManager<H> {
    async fn register(&self, shortcut: &str, callback: ShortcutCallback) -> Result<()> {
        log::debug!("Registering global shortcut '{shortcut}'");
        Ok(self.hotkeys.register(shortcut, callback).await?)
    }

    async fn is_registered(&self, shortcut: &str) -> Result<bool> {
        Ok(self.hotkeys.is_registered(shortcut).await?)
    }

    async fn unregister(&self, shortcut: &str) -> Result<()> {
        Ok(self.hotkeys.unregister(shortcut).await?)
    }

    async fn unregister_all(&self) -> Result<()> {
        Ok(self.hotkeys.unregister_all().await?)
    }
}
