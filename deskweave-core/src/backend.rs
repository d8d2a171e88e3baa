//! The backend contract implemented once per desktop runtime.
//!
//! A backend owns its driver handle and the capability objects built on top of
//! it. The container Facade drives a backend through this trait only; it
//! never sees driver types. Capabilities a runtime lacks are reported with
//! [`ContainerError::Unsupported`] at call time, never emulated silently.

use std::future::Future;

use serde_json::{Map, Value};

use crate::bus::MessageBus;
use crate::display::ScreenManager;
use crate::error::{ContainerError, Result};
use crate::layout::PersistedWindow;
use crate::notification::{
    MenuItem, NotificationHandler, NotificationOptions, TrayIconDetails, TrayListener,
};
use crate::options::{PropertyMapping, WindowOptions, transform_properties};
use crate::shortcuts::GlobalShortcutManager;
use crate::window::ContainerWindow;

pub trait Backend: Send + Sync + 'static {
    type Window: ContainerWindow;
    type Bus: MessageBus;
    type Screen: ScreenManager;
    type Shortcuts: GlobalShortcutManager;

    /// Host type name, e.g. "Glue42".
    fn host_type(&self) -> &'static str;

    /// Connect to the driver and wait for its ready signal.
    fn connect(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Wrap the application's main window (resolved during `connect`).
    fn main_window(&self) -> Result<Self::Window>;

    /// Wrap the window this process runs in.
    fn current_window(&self) -> Result<Self::Window>;

    /// Every window the backend could list as part of this application, in
    /// backend order. The container orders them into the ownership tree.
    fn list_windows(&self) -> impl Future<Output = Result<Vec<Self::Window>>> + Send;

    /// Canonical-to-native option renames for window creation.
    fn window_options_map(&self) -> &'static [PropertyMapping];

    /// Translate canonical options into the native options blob.
    ///
    /// The default applies [`Backend::window_options_map`]; backends override
    /// this to handle options that are not simple renames.
    fn native_window_options(&self, options: &WindowOptions) -> Map<String, Value> {
        transform_properties(&options.to_map(), self.window_options_map())
    }

    /// Open a new window with already translated native options.
    fn create_window(
        &self,
        url: &str,
        native_options: Map<String, Value>,
    ) -> impl Future<Output = Result<Self::Window>> + Send;

    /// Re-open a window from a layout snapshot (native options + bounds).
    fn reopen_window(
        &self,
        persisted: &PersistedWindow,
    ) -> impl Future<Output = Result<Self::Window>> + Send;

    fn message_bus(&self) -> Option<&Self::Bus>;

    fn screen(&self) -> Option<&Self::Screen>;

    /// `None` when the runtime has no hotkey support.
    fn global_shortcuts(&self) -> Option<&Self::Shortcuts>;

    fn show_notification(
        &self,
        title: &str,
        options: &NotificationOptions,
    ) -> impl Future<Output = Result<()>> + Send;

    /// A handler that raises notifications through this backend, used when the
    /// container replaces the environment's notification entry point.
    /// `None` if the backend has native notifications.
    fn notification_handler(&self) -> Option<NotificationHandler>;

    fn add_tray_icon(
        &self,
        _details: &TrayIconDetails,
        _listener: TrayListener,
        _menu_items: &[MenuItem],
    ) -> Result<()> {
        Err(ContainerError::unsupported(self.host_type(), "addTrayIcon"))
    }

    /// Forward a log line to the backend's own logger.
    fn log(&self, level: log::Level, message: &str) -> impl Future<Output = Result<()>> + Send;
}
