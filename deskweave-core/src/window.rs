//! The window capability contract.

use std::fmt;
use std::future::Future;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::events::{EventListener, WindowEventType};
use crate::geometry::Rectangle;

/// Lifecycle state of a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Maximized,
}

impl WindowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowState::Normal => "normal",
            WindowState::Minimized => "minimized",
            WindowState::Maximized => "maximized",
        }
    }
}

impl fmt::Display for WindowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(WindowState::Normal),
            "minimized" => Ok(WindowState::Minimized),
            "maximized" => Ok(WindowState::Maximized),
            other => Err(format!("unknown window state '{other}'")),
        }
    }
}

/// A wrapper around one backend-native window.
///
/// Constructing a wrapper never creates an OS window; window creation is a
/// container operation. Several wrappers may point at the same native window
/// (for example after re-enumeration); each owns its own listener table.
///
/// Async operations return futures that suspend only while waiting on the
/// backend driver.
pub trait ContainerWindow: Send + Sync + Sized + 'static {
    /// Adapter-defined native window handle. Never inspected by the core.
    type Native: Send + Sync;

    /// Stable, backend-assigned identifier.
    fn id(&self) -> String;

    /// Backend-assigned name (may differ from the id).
    fn name(&self) -> String;

    /// URL currently loaded in the window.
    fn url(&self) -> String;

    /// Id of the owning (parent) window as reported by the backend.
    fn owner_id(&self) -> Option<String>;

    fn native(&self) -> &Self::Native;

    fn load(&self, url: &str) -> impl Future<Output = Result<()>> + Send;

    fn focus(&self) -> impl Future<Output = Result<()>> + Send;

    fn show(&self) -> impl Future<Output = Result<()>> + Send;

    fn hide(&self) -> impl Future<Output = Result<()>> + Send;

    fn close(&self) -> impl Future<Output = Result<()>> + Send;

    fn minimize(&self) -> impl Future<Output = Result<()>> + Send;

    fn maximize(&self) -> impl Future<Output = Result<()>> + Send;

    fn restore(&self) -> impl Future<Output = Result<()>> + Send;

    fn bring_to_front(&self) -> impl Future<Output = Result<()>> + Send;

    fn is_showing(&self) -> impl Future<Output = Result<bool>> + Send;

    /// Capture the window contents as an encoded image string.
    fn get_snapshot(&self) -> impl Future<Output = Result<String>> + Send;

    fn get_bounds(&self) -> impl Future<Output = Result<Rectangle>> + Send;

    fn set_bounds(&self, bounds: Rectangle) -> impl Future<Output = Result<()>> + Send;

    fn flash(&self, enable: bool) -> impl Future<Output = Result<()>> + Send;

    /// Native (backend-specific) creation options, as an opaque blob.
    fn get_options(&self) -> impl Future<Output = Result<Value>> + Send;

    fn get_state(&self) -> impl Future<Output = Result<WindowState>> + Send;

    fn set_state(&self, state: WindowState) -> impl Future<Output = Result<()>> + Send;

    /// Whether this backend supports window grouping at all.
    fn allow_grouping(&self) -> bool {
        false
    }

    /// Current group members, including `self`. Always symmetric.
    fn get_group(&self) -> impl Future<Output = Result<Vec<Self>>> + Send;

    /// Merge this window's group into `target`'s group.
    fn join_group(&self, target: &Self) -> impl Future<Output = Result<()>> + Send;

    /// Leave the current group; the remaining members stay grouped.
    fn leave_group(&self) -> impl Future<Output = Result<()>> + Send;

    /// Canonical events this adapter fully supports.
    fn supported_events(&self) -> &'static [WindowEventType] {
        WindowEventType::ALL
    }

    /// Register `listener` for `event` (replace policy, see
    /// [`crate::events::WindowListeners`]). Unsupported events are a no-op.
    fn attach_listener(&self, event: WindowEventType, listener: EventListener);

    /// Remove `listener` from `event`. No-op if it is not attached.
    ///
    /// Listeners match by identity (`Arc::ptr_eq`): pass the same `Arc` given to
    /// [`attach_listener`](Self::attach_listener). An equivalent closure in a
    /// separate allocation is not matched.
    fn detach_listener(&self, event: WindowEventType, listener: &EventListener);

    /// Attach by event name. Names outside the canonical set are ignored.
    ///
    /// Returns `true` if the name was recognized and supported.
    fn attach_listener_by_name(&self, name: &str, listener: EventListener) -> bool {
        match WindowEventType::from_name(name) {
            Some(event) if self.supported_events().contains(&event) => {
                self.attach_listener(event, listener);
                true
            }
            _ => {
                log::debug!("Ignoring listener for unsupported window event '{name}'");
                false
            }
        }
    }

    /// Detach by event name. Unknown names are ignored.
    fn detach_listener_by_name(&self, name: &str, listener: &EventListener) {
        if let Some(event) = WindowEventType::from_name(name) {
            self.detach_listener(event, listener);
        }
    }
}
