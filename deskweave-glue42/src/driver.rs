//! The Glue42 Desktop driver surface.
//!
//! These traits describe the subset of the Glue42 runtime API the adapter
//! talks to: the `windows` API (enumeration, creation, window handles and
//! their event sources), the `bus`, `hotkeys`, `agm` method invocation,
//! `displays` and the `logger`. A production build binds them to the runtime
//! bridge; tests use the in-memory driver in [`crate::mock`].
//!
//! Display and pointer records are handed over as raw JSON because their shape
//! is owned by the runtime; the adapter validates them when translating.

use std::future::Future;
use std::sync::Arc;

use deskweave_config::Glue42Features;
use deskweave_core::BackendError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result type for raw driver calls.
pub type DriverResult<T> = std::result::Result<T, BackendError>;

/// Window bounds in Glue42 naming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdBounds {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

/// Native window event sources (`onBoundsChanged`, `onFocusChanged`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GdWindowEvent {
    BoundsChanged,
    FocusChanged,
    Closing,
    Maximized,
    Minimized,
    Normal,
}

/// Native event handler. Receives the window the event fired on.
pub type GdWindowHandler<W> = Arc<dyn Fn(&W) + Send + Sync>;

/// Unsubscribe function returned by every native event source.
pub type GdUnsubscribe = Box<dyn FnOnce() + Send + Sync>;

/// Bus delivery callback: `(data, topic)`.
pub type GdBusCallback = Arc<dyn Fn(&Value, &str) + Send + Sync>;

/// Hotkey callback.
pub type GdHotkeyCallback = Arc<dyn Fn() + Send + Sync>;

/// A Glue42 window handle. Cloning yields another handle to the same window.
pub trait GdWindow: Clone + Send + Sync + 'static {
    fn id(&self) -> String;
    fn name(&self) -> String;
    fn url(&self) -> String;
    fn bounds(&self) -> GdBounds;
    fn is_visible(&self) -> bool;
    fn is_focused(&self) -> bool;
    /// `"normal"`, `"maximized"` or `"minimized"`.
    fn state(&self) -> String;
    /// Creation settings, including `parentInstanceId` and `isChild`.
    fn settings(&self) -> Value;
    /// Members of this window's group, including the window itself.
    fn group_members(&self) -> Vec<Self>;

    fn navigate(&self, url: &str) -> impl Future<Output = DriverResult<()>> + Send;
    fn focus(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn set_visible(&self, visible: bool) -> impl Future<Output = DriverResult<()>> + Send;
    fn close(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn minimize(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn maximize(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn restore(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn maximize_restore(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn capture(&self) -> impl Future<Output = DriverResult<String>> + Send;
    fn flash(&self, enable: bool) -> impl Future<Output = DriverResult<()>> + Send;
    fn move_resize(&self, bounds: GdBounds) -> impl Future<Output = DriverResult<()>> + Send;
    /// Attach this window to `target`'s group.
    fn snap(&self, target: &Self) -> impl Future<Output = DriverResult<()>> + Send;
    /// Detach this window from its group.
    fn ungroup(&self) -> impl Future<Output = DriverResult<()>> + Send;
    fn activate(&self) -> impl Future<Output = DriverResult<()>> + Send;

    /// Subscribe to a native event source.
    fn on(&self, event: GdWindowEvent, handler: GdWindowHandler<Self>) -> GdUnsubscribe;
}

/// The Glue42 bus API.
pub trait GdBus: Clone + Send + Sync + 'static {
    /// Native unsubscribe handle.
    type Handle: Send + Sync + 'static;

    fn subscribe(
        &self,
        topic: &str,
        callback: GdBusCallback,
        target: Option<String>,
    ) -> impl Future<Output = DriverResult<Self::Handle>> + Send;

    fn unsubscribe(&self, handle: Self::Handle) -> impl Future<Output = DriverResult<()>> + Send;

    fn publish(
        &self,
        topic: &str,
        data: Value,
        target: Option<String>,
    ) -> impl Future<Output = DriverResult<()>> + Send;
}

/// The Glue42 hotkeys API.
pub trait GdHotkeys: Clone + Send + Sync + 'static {
    fn register(
        &self,
        hotkey: &str,
        callback: GdHotkeyCallback,
    ) -> impl Future<Output = DriverResult<()>> + Send;
    fn is_registered(&self, hotkey: &str) -> impl Future<Output = DriverResult<bool>> + Send;
    fn unregister(&self, hotkey: &str) -> impl Future<Output = DriverResult<()>> + Send;
    fn unregister_all(&self) -> impl Future<Output = DriverResult<()>> + Send;
}

/// The Glue42 desktop object returned by `Glue(...)`.
pub trait GdDesktop: Send + Sync + 'static {
    type Window: GdWindow;
    type Bus: GdBus;
    type Hotkeys: GdHotkeys;

    /// Initialize the requested APIs and resolve once the runtime is ready.
    fn init(&self, features: &Glue42Features) -> impl Future<Output = DriverResult<()>> + Send;

    /// `windows.my()`: the window this process runs in.
    fn my_window(&self) -> DriverResult<Self::Window>;

    fn find_by_id(&self, id: &str) -> Option<Self::Window>;

    /// `windows.list()`
    fn list(&self) -> Vec<Self::Window>;

    /// `windows.open(name, url, options)`
    fn open(
        &self,
        name: &str,
        url: &str,
        options: Value,
    ) -> impl Future<Output = DriverResult<Self::Window>> + Send;

    /// `None` when the bus API was not initialized.
    fn bus(&self) -> Option<Self::Bus>;

    /// `None` when the hotkeys API is unavailable.
    fn hotkeys(&self) -> Option<Self::Hotkeys>;

    /// `agm.invoke(method, args)`
    fn invoke(&self, method: &str, args: Value) -> impl Future<Output = DriverResult<Value>> + Send;

    fn primary_display(&self) -> impl Future<Output = DriverResult<Value>> + Send;

    fn all_displays(&self) -> impl Future<Output = DriverResult<Vec<Value>>> + Send;

    fn mouse_position(&self) -> impl Future<Output = DriverResult<Value>> + Send;

    /// `logger.log(message, level)`
    fn log(&self, message: &str, level: &str) -> impl Future<Output = DriverResult<()>> + Send;
}
