//! The host notification entry point.
//!
//! [`NotificationHub`] is the slot applications raise notifications through.
//! A container whose backend has no native notifications installs its own
//! handler here on connect and puts the previous one back on teardown.

use deskweave_core::events::invoke_isolated;
use deskweave_core::{NotificationEnvironment, NotificationHandler, NotificationOptions};
use parking_lot::Mutex;

#[derive(Default)]
pub struct NotificationHub {
    handler: Mutex<Option<NotificationHandler>>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// A hub whose entry point starts out as `handler`.
    pub fn with_handler(handler: NotificationHandler) -> Self {
        Self {
            handler: Mutex::new(Some(handler)),
        }
    }

    /// Raise a notification through the installed handler.
    ///
    /// Returns `false` if no handler is installed or the handler panicked.
    pub fn notify(&self, title: &str, options: &NotificationOptions) -> bool {
        let handler = self.handler.lock().clone();
        match handler {
            Some(handler) => invoke_isolated("notification", || handler(title, options)),
            None => {
                crate::debug_log!("NOTIFY", "No notification handler for '{}'", title);
                false
            }
        }
    }

    pub fn is_installed(&self) -> bool {
        self.handler.lock().is_some()
    }
}

impl NotificationEnvironment for NotificationHub {
    fn replace_notification(
        &self,
        handler: Option<NotificationHandler>,
    ) -> Option<NotificationHandler> {
        std::mem::replace(&mut *self.handler.lock(), handler)
    }
}
