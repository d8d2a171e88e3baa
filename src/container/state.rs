//! Container lifecycle state, runtime options and container-level events.

use std::fmt;
use std::path::PathBuf;

use deskweave_config::Config;
use deskweave_core::ContainerError;

/// Lifecycle of a [`super::Container`].
///
/// `Uninitialized → Connecting → Ready → Closing → Closed`. A failed connect
/// returns to `Uninitialized`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ContainerState {
    #[default]
    Uninitialized,
    Connecting,
    Ready,
    Closing,
    Closed,
}

impl ContainerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Uninitialized => "Uninitialized",
            ContainerState::Connecting => "Connecting",
            ContainerState::Ready => "Ready",
            ContainerState::Closing => "Closing",
            ContainerState::Closed => "Closed",
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime options for one container instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerOptions {
    /// Install the backend's notification handler into the environment.
    pub replace_notification_api: bool,
    /// Close child windows before the main window on shutdown.
    pub close_children_first: bool,
    /// Layout store location.
    pub layouts_path: PathBuf,
    /// Pixels of a restored window kept on screen.
    pub restore_min_visible: u32,
}

impl ContainerOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            replace_notification_api: config.replace_notification_api,
            close_children_first: config.close_children_first,
            layouts_path: config.layouts_path(),
            restore_min_visible: config.restore_min_visible,
        }
    }

    pub fn with_layouts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.layouts_path = path.into();
        self
    }

    pub fn with_replace_notification_api(mut self, enabled: bool) -> Self {
        self.replace_notification_api = enabled;
        self
    }
}

impl Default for ContainerOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Events raised by the container itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerEvent {
    WindowCreated { id: String, name: String },
    LayoutSaved { name: String },
    LayoutLoaded { name: String },
    StateChanged { from: ContainerState, to: ContainerState },
}

impl ContainerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerEvent::WindowCreated { .. } => "window-created",
            ContainerEvent::LayoutSaved { .. } => "layout-saved",
            ContainerEvent::LayoutLoaded { .. } => "layout-loaded",
            ContainerEvent::StateChanged { .. } => "state-changed",
        }
    }
}

/// Outcome of a container shutdown.
#[derive(Debug, Default)]
pub struct CloseReport {
    /// Ids of the windows that closed.
    pub closed: Vec<String>,
    /// Windows that refused to close, with the reason.
    pub failures: Vec<(String, ContainerError)>,
}

impl CloseReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
