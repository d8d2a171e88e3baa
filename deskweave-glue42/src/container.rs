//! The Glue42 [`Backend`].
//!
//! Connecting initializes the driver with the configured feature set, resolves
//! the application's main window by walking the owner chain up from the
//! current window, and builds the capability objects (bus, displays,
//! hotkeys).

use std::sync::Arc;

use deskweave_config::{Config, Glue42Features};
use deskweave_core::layout::find_root;
use deskweave_core::options::transform_properties;
use deskweave_core::{
    Backend, ContainerError, NotificationHandler, NotificationOptions, PersistedWindow,
    PropertyMapping, Result, WindowOptions,
};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::bus::Glue42MessageBus;
use crate::driver::{GdDesktop, GdWindow};
use crate::screen::Glue42DisplayManager;
use crate::shortcuts::Glue42GlobalShortcutManager;
use crate::window::{Glue42Window, IS_CHILD, PARENT_INSTANCE_ID, is_child, parent_instance_id};

pub const HOST_TYPE: &str = "Glue42";

/// Method raising a notification through the Glue42 notification service.
pub const RAISE_NOTIFICATION_METHOD: &str = "T42.GNS.Publish.RaiseNotification";

/// Canonical window options renamed to Glue42 settings.
pub const WINDOW_OPTIONS_MAP: &[PropertyMapping] = &[
    PropertyMapping::new("alwaysOnTop", "onTop"),
    PropertyMapping::new("maximizable", "allowMaximize"),
    PropertyMapping::new("minimizable", "allowMinimize"),
    PropertyMapping::new("taskbar", "showInTaskbar"),
    PropertyMapping::new("x", "left"),
    PropertyMapping::new("y", "top"),
    PropertyMapping::new("resizable", "hasSizeAreas"),
];

/// Notification options renamed for the notification service.
pub const NOTIFICATION_OPTIONS_MAP: &[PropertyMapping] =
    &[PropertyMapping::new("body", "description")];

/// Build the `RaiseNotification` arguments. Options may override `severity`.
pub fn notification_request(title: &str, options: &NotificationOptions) -> Value {
    let mut notification = Map::new();
    notification.insert("title".into(), json!(title));
    notification.insert("severity".into(), json!("High"));
    notification.extend(transform_properties(
        &options.to_map(),
        NOTIFICATION_OPTIONS_MAP,
    ));
    json!({ "notification": notification })
}

fn level_name(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "error",
        log::Level::Warn => "warn",
        log::Level::Info => "info",
        log::Level::Debug => "debug",
        log::Level::Trace => "trace",
    }
}

pub struct Glue42Container<D: GdDesktop> {
    desktop: Arc<D>,
    features: Glue42Features,
    main: Option<D::Window>,
    bus: Option<Glue42MessageBus<D::Bus>>,
    screen: Option<Glue42DisplayManager<D>>,
    shortcuts: Option<Glue42GlobalShortcutManager<D::Hotkeys>>,
}

impl<D: GdDesktop> Glue42Container<D> {
    pub fn new(desktop: D, features: Glue42Features) -> Self {
        Self {
            desktop: Arc::new(desktop),
            features,
            main: None,
            bus: None,
            screen: None,
            shortcuts: None,
        }
    }

    pub fn from_config(desktop: D, config: &Config) -> Self {
        Self::new(desktop, config.glue42)
    }

    pub fn desktop(&self) -> &Arc<D> {
        &self.desktop
    }

    fn wrap(window: D::Window) -> Glue42Window<D::Window> {
        Glue42Window::new(window)
    }

    async fn open(&self, name: &str, url: &str, mut settings: Map<String, Value>) -> Result<Glue42Window<D::Window>> {
        settings.insert(IS_CHILD.into(), Value::Bool(true));
        let window = self.desktop.open(name, url, Value::Object(settings)).await?;
        log::info!("Opened Glue42 window '{}' ({})", name, window.id());
        Ok(Self::wrap(window))
    }
}

impl<D: GdDesktop> Backend for Glue42Container<D> {
    type Window = Glue42Window<D::Window>;
    type Bus = Glue42MessageBus<D::Bus>;
    type Screen = Glue42DisplayManager<D>;
    type Shortcuts = Glue42GlobalShortcutManager<D::Hotkeys>;

    fn host_type(&self) -> &'static str {
        HOST_TYPE
    }

    async fn connect(&mut self) -> Result<()> {
        self.desktop.init(&self.features).await?;

        let current = self.desktop.my_window()?;
        let desktop = Arc::clone(&self.desktop);
        let main = find_root(
            current,
            |w| w.id(),
            parent_instance_id,
            |id| desktop.find_by_id(id),
        );
        log::info!("Glue42 connected; main window is '{}'", main.id());
        self.main = Some(main);

        self.bus = if self.features.bus {
            self.desktop.bus().map(Glue42MessageBus::new)
        } else {
            None
        };
        self.screen = Some(Glue42DisplayManager::new(Arc::clone(&self.desktop)));
        self.shortcuts = if self.features.hotkeys {
            self.desktop.hotkeys().map(Glue42GlobalShortcutManager::new)
        } else {
            None
        };
        Ok(())
    }

    fn main_window(&self) -> Result<Self::Window> {
        self.main
            .clone()
            .map(Self::wrap)
            .ok_or_else(|| ContainerError::not_ready("getMainWindow", "disconnected"))
    }

    fn current_window(&self) -> Result<Self::Window> {
        Ok(Self::wrap(self.desktop.my_window()?))
    }

    async fn list_windows(&self) -> Result<Vec<Self::Window>> {
        Ok(self
            .desktop
            .list()
            .into_iter()
            .filter(is_child)
            .map(Self::wrap)
            .collect())
    }

    fn window_options_map(&self) -> &'static [PropertyMapping] {
        WINDOW_OPTIONS_MAP
    }

    fn native_window_options(&self, options: &WindowOptions) -> Map<String, Value> {
        let mut native = transform_properties(&options.to_map(), WINDOW_OPTIONS_MAP);
        if native.remove("center") == Some(Value::Bool(true)) {
            native.insert("startLocation".into(), json!("CenterScreen"));
        }
        native
    }

    async fn create_window(&self, url: &str, native_options: Map<String, Value>) -> Result<Self::Window> {
        let name = native_options
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        self.open(&name, url, native_options).await
    }

    /// Reopened windows become direct children of the current window: nested
    /// ownership from the saved layout is intentionally flattened.
    async fn reopen_window(&self, persisted: &PersistedWindow) -> Result<Self::Window> {
        let mut settings = match &persisted.options {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        // The runtime assigns the new owner.
        settings.remove(PARENT_INSTANCE_ID);
        settings.insert("left".into(), json!(persisted.bounds.x));
        settings.insert("top".into(), json!(persisted.bounds.y));
        settings.insert("width".into(), json!(persisted.bounds.width));
        settings.insert("height".into(), json!(persisted.bounds.height));
        self.open(&persisted.name, &persisted.url, settings).await
    }

    fn message_bus(&self) -> Option<&Self::Bus> {
        self.bus.as_ref()
    }

    fn screen(&self) -> Option<&Self::Screen> {
        self.screen.as_ref()
    }

    fn global_shortcuts(&self) -> Option<&Self::Shortcuts> {
        self.shortcuts.as_ref()
    }

    async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        self.desktop
            .invoke(RAISE_NOTIFICATION_METHOD, notification_request(title, options))
            .await?;
        Ok(())
    }

    fn notification_handler(&self) -> Option<NotificationHandler> {
        let desktop = Arc::clone(&self.desktop);
        Some(Arc::new(move |title: &str, options: &NotificationOptions| {
            let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                log::warn!("No async runtime; dropping notification '{title}'");
                return;
            };
            let desktop = Arc::clone(&desktop);
            let request = notification_request(title, options);
            runtime.spawn(async move {
                if let Err(e) = desktop.invoke(RAISE_NOTIFICATION_METHOD, request).await {
                    log::error!("Failed to raise notification: {e}");
                }
            });
        }))
    }

    async fn log(&self, level: log::Level, message: &str) -> Result<()> {
        Ok(self.desktop.log(message, level_name(level)).await?)
    }
}
