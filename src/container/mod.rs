//! The container Facade.
//!
//! [`Container`] owns one backend and exposes the runtime-independent API:
//! window queries and creation, notifications, the message bus, displays,
//! global shortcuts, layouts and shutdown. Operations other than connect,
//! close and layout-store queries require the `Ready` state and fail fast with
//! [`ContainerError::NotReady`] otherwise.
//!
//! The backend sits behind an async `RwLock`: `connect` takes it for writing,
//! every other operation for reading. Lifecycle state lives in a separate
//! synchronous lock that is never held across an await point.

pub mod state;

use std::sync::{Arc, Weak};

use deskweave_config::Config;
use deskweave_core::layout::{capture_layout, collect_window_tree};
use deskweave_core::{
    Backend, BusListener, ContainerError, ContainerWindow, Display, EventArgs, EventEmitter,
    GlobalShortcutManager, ListenerId, MenuItem, MessageBus, MessageBusOptions,
    MessageBusSubscription, NotificationEnvironment, NotificationHandler, NotificationOptions,
    PersistedWindowLayout, Point, Result, ScreenManager, ShortcutCallback, TrayIconDetails,
    TrayListener, WindowEventType, WindowOptions,
};
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::RwLock as AsyncRwLock;

pub use state::{CloseReport, ContainerEvent, ContainerOptions, ContainerState};

use crate::layouts::restore::{LoadReport, restore_layout};
use crate::layouts::storage::{load_layouts_from, save_layouts_to};
use crate::layouts::LayoutManager;

fn storage_error(err: anyhow::Error) -> ContainerError {
    ContainerError::Storage(format!("{err:#}"))
}

struct Inner<B: Backend> {
    backend: AsyncRwLock<B>,
    host_type: &'static str,
    state: RwLock<ContainerState>,
    options: ContainerOptions,
    environment: Option<Arc<dyn NotificationEnvironment>>,
    /// Entry point that was installed before ours; `Some` while replaced.
    replaced_notification: Mutex<Option<Option<NotificationHandler>>>,
    /// Main window wrapper carrying the shutdown-on-close listener.
    main_watch: Mutex<Option<B::Window>>,
    events: EventEmitter<ContainerEvent>,
}

impl<B: Backend> Inner<B> {
    fn emit(&self, event: ContainerEvent) {
        self.events.emit(event.name(), &event);
    }

    fn state(&self) -> ContainerState {
        *self.state.read()
    }

    /// Move from `from` to `to`, or fail with `NotReady` if the container is
    /// in any other state.
    fn advance(
        &self,
        operation: &'static str,
        from: ContainerState,
        to: ContainerState,
    ) -> Result<()> {
        {
            let mut state = self.state.write();
            if *state != from {
                return Err(ContainerError::not_ready(operation, *state));
            }
            *state = to;
        }
        crate::debug_info!("CONTAINER", "{} -> {}", from, to);
        self.emit(ContainerEvent::StateChanged { from, to });
        Ok(())
    }

    fn restore_notification(&self) {
        let replaced = self.replaced_notification.lock().take();
        if let (Some(previous), Some(environment)) = (replaced, &self.environment) {
            environment.replace_notification(previous);
            crate::debug_info!("NOTIFY", "Restored the previous notification entry point");
        }
    }

    /// Close every window of the application, best effort.
    ///
    /// `skip` names a window that is already going away (the main window
    /// when shutdown was triggered by its close event).
    async fn close_windows(&self, skip: Option<&str>) -> CloseReport {
        let mut report = CloseReport::default();
        let backend = self.backend.read().await;

        let main = match backend.main_window() {
            Ok(main) => main,
            Err(e) => {
                report.failures.push((String::new(), e));
                return report;
            }
        };
        let candidates = match backend.list_windows().await {
            Ok(windows) => windows,
            Err(e) => {
                log::warn!("Could not enumerate windows for shutdown: {e}");
                report.failures.push((main.id(), e));
                Vec::new()
            }
        };

        // Pre-order puts owners before the windows they own.
        let mut windows = collect_window_tree(main, candidates);
        if self.options.close_children_first {
            windows.reverse();
        }

        for window in &windows {
            let id = window.id();
            if skip == Some(id.as_str()) {
                continue;
            }
            match window.close().await {
                Ok(()) => report.closed.push(id),
                Err(e) => {
                    log::warn!("Window '{id}' failed to close: {e}");
                    report.failures.push((id, e));
                }
            }
        }
        report
    }

    async fn shutdown(&self, skip: Option<String>) -> Result<CloseReport> {
        let from = {
            let mut state = self.state.write();
            let from = *state;
            match from {
                ContainerState::Ready => *state = ContainerState::Closing,
                ContainerState::Uninitialized | ContainerState::Closed => {
                    *state = ContainerState::Closed
                }
                _ => return Err(ContainerError::not_ready("close", from)),
            }
            from
        };

        if from != ContainerState::Ready {
            if from == ContainerState::Uninitialized {
                self.emit(ContainerEvent::StateChanged {
                    from,
                    to: ContainerState::Closed,
                });
            }
            return Ok(CloseReport::default());
        }
        self.emit(ContainerEvent::StateChanged {
            from,
            to: ContainerState::Closing,
        });
        crate::debug_info!("CONTAINER", "Closing (trigger: {:?})", skip);

        let watch = self.main_watch.lock().take();
        drop(watch);

        let report = self.close_windows(skip.as_deref()).await;
        self.restore_notification();

        *self.state.write() = ContainerState::Closed;
        self.emit(ContainerEvent::StateChanged {
            from: ContainerState::Closing,
            to: ContainerState::Closed,
        });
        crate::debug_info!(
            "CONTAINER",
            "Closed {} windows, {} failures",
            report.closed.len(),
            report.failures.len()
        );
        Ok(report)
    }
}

impl<B: Backend> Drop for Inner<B> {
    fn drop(&mut self) {
        self.restore_notification();
    }
}

/// A desktop container over backend `B`.
///
/// Cloning is cheap and yields another handle to the same container.
pub struct Container<B: Backend> {
    inner: Arc<Inner<B>>,
}

impl<B: Backend> Clone for Container<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> Container<B> {
    pub fn new(backend: B, options: ContainerOptions) -> Self {
        Self::build(backend, options, None)
    }

    /// A container that may replace `environment`'s notification entry point
    /// while it is connected.
    pub fn with_environment(
        backend: B,
        options: ContainerOptions,
        environment: Arc<dyn NotificationEnvironment>,
    ) -> Self {
        Self::build(backend, options, Some(environment))
    }

    pub fn from_config(backend: B, config: &Config) -> Self {
        Self::new(backend, ContainerOptions::from_config(config))
    }

    fn build(
        backend: B,
        options: ContainerOptions,
        environment: Option<Arc<dyn NotificationEnvironment>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                host_type: backend.host_type(),
                backend: AsyncRwLock::new(backend),
                state: RwLock::new(ContainerState::Uninitialized),
                options,
                environment,
                replaced_notification: Mutex::new(None),
                main_watch: Mutex::new(None),
                events: EventEmitter::new(),
            }),
        }
    }

    pub fn state(&self) -> ContainerState {
        self.inner.state()
    }

    pub fn is_ready(&self) -> bool {
        self.state() == ContainerState::Ready
    }

    pub fn host_type(&self) -> &'static str {
        self.inner.host_type
    }

    pub fn options(&self) -> &ContainerOptions {
        &self.inner.options
    }

    /// Listen to container-level events.
    pub fn add_event_listener(
        &self,
        listener: impl Fn(&ContainerEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.inner.events.add_listener(listener)
    }

    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.inner.events.remove_listener(id)
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<()> {
        match self.state() {
            ContainerState::Ready => Ok(()),
            state => Err(ContainerError::not_ready(operation, state)),
        }
    }

    fn unsupported(&self, capability: &'static str) -> ContainerError {
        ContainerError::unsupported(self.host_type(), capability)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Connect the backend and wait until it is ready.
    ///
    /// Connecting a `Ready` container is a no-op. A failed connect returns the
    /// container to `Uninitialized`, so it can be retried.
    pub async fn connect(&self) -> Result<()> {
        if self.state() == ContainerState::Ready {
            return Ok(());
        }
        self.inner.advance(
            "connect",
            ContainerState::Uninitialized,
            ContainerState::Connecting,
        )?;

        match self.connect_backend().await {
            Ok(()) => {
                self.inner.advance(
                    "connect",
                    ContainerState::Connecting,
                    ContainerState::Ready,
                )?;
                log::info!("{} container ready", self.host_type());
                Ok(())
            }
            Err(e) => {
                crate::debug_error!("CONTAINER", "Connect failed: {}", e);
                log::error!("Failed to connect {} backend: {e}", self.host_type());
                self.inner.advance(
                    "connect",
                    ContainerState::Connecting,
                    ContainerState::Uninitialized,
                )?;
                Err(e)
            }
        }
    }

    async fn connect_backend(&self) -> Result<()> {
        let mut backend = self.inner.backend.write().await;
        backend.connect().await?;
        let main = backend.main_window()?;

        if self.inner.options.replace_notification_api
            && let Some(environment) = &self.inner.environment
            && let Some(handler) = backend.notification_handler()
        {
            let previous = environment.replace_notification(Some(handler));
            *self.inner.replaced_notification.lock() = Some(previous);
            crate::debug_info!(
                "NOTIFY",
                "Notification entry point now routes through {}",
                self.host_type()
            );
        }

        self.watch_main_window(main);
        Ok(())
    }

    /// Shut the container down when the main window closes.
    fn watch_main_window(&self, main: B::Window) {
        let weak: Weak<Inner<B>> = Arc::downgrade(&self.inner);
        main.attach_listener(
            WindowEventType::Close,
            Arc::new(move |args: &EventArgs| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    log::warn!("Main window closed outside an async runtime; container left open");
                    return;
                };
                let main_id = args.sender.clone();
                runtime.spawn(async move {
                    if let Err(e) = inner.shutdown(Some(main_id)).await {
                        log::debug!("Shutdown on main window close skipped: {e}");
                    }
                });
            }),
        );
        *self.inner.main_watch.lock() = Some(main);
    }

    /// Close every window and tear the container down.
    ///
    /// Window close failures do not stop the shutdown; they are collected in
    /// the report. Closing an already closed container is a no-op.
    pub async fn close(&self) -> Result<CloseReport> {
        self.inner.shutdown(None).await
    }

    // ========================================================================
    // Windows
    // ========================================================================

    async fn window_tree(backend: &B) -> Result<Vec<B::Window>> {
        let main = backend.main_window()?;
        let candidates = backend.list_windows().await?;
        Ok(collect_window_tree(main, candidates))
    }

    pub async fn get_main_window(&self) -> Result<B::Window> {
        self.ensure_ready("getMainWindow")?;
        self.inner.backend.read().await.main_window()
    }

    pub async fn get_current_window(&self) -> Result<B::Window> {
        self.ensure_ready("getCurrentWindow")?;
        self.inner.backend.read().await.current_window()
    }

    /// The main window followed by every window it (transitively) owns, in
    /// depth-first order, without duplicates.
    pub async fn get_all_windows(&self) -> Result<Vec<B::Window>> {
        self.ensure_ready("getAllWindows")?;
        let backend = self.inner.backend.read().await;
        let windows = Self::window_tree(&backend).await?;
        crate::debug_log!("CONTAINER", "Enumerated {} windows", windows.len());
        Ok(windows)
    }

    pub async fn get_window_by_id(&self, id: &str) -> Result<Option<B::Window>> {
        Ok(self
            .get_all_windows()
            .await?
            .into_iter()
            .find(|window| window.id() == id))
    }

    pub async fn get_window_by_name(&self, name: &str) -> Result<Option<B::Window>> {
        Ok(self
            .get_all_windows()
            .await?
            .into_iter()
            .find(|window| window.name() == name))
    }

    pub async fn create_window(&self, url: &str, options: &WindowOptions) -> Result<B::Window> {
        self.ensure_ready("createWindow")?;
        let window = {
            let backend = self.inner.backend.read().await;
            let native = backend.native_window_options(options);
            crate::debug_log!("CONTAINER", "Creating window for {} with {:?}", url, native);
            backend.create_window(url, native).await?
        };
        self.inner.emit(ContainerEvent::WindowCreated {
            id: window.id(),
            name: window.name(),
        });
        Ok(window)
    }

    // ========================================================================
    // Notifications and tray
    // ========================================================================

    pub async fn show_notification(&self, title: &str, options: &NotificationOptions) -> Result<()> {
        self.ensure_ready("showNotification")?;
        crate::debug_log!("NOTIFY", "Showing notification '{}'", title);
        self.inner
            .backend
            .read()
            .await
            .show_notification(title, options)
            .await
    }

    pub async fn add_tray_icon(
        &self,
        details: &TrayIconDetails,
        listener: TrayListener,
        menu_items: &[MenuItem],
    ) -> Result<()> {
        self.ensure_ready("addTrayIcon")?;
        self.inner
            .backend
            .read()
            .await
            .add_tray_icon(details, listener, menu_items)
    }

    // ========================================================================
    // Message bus
    // ========================================================================

    pub async fn subscribe(
        &self,
        topic: &str,
        listener: BusListener,
        options: Option<MessageBusOptions>,
    ) -> Result<MessageBusSubscription> {
        self.ensure_ready("subscribe")?;
        let backend = self.inner.backend.read().await;
        let bus = backend
            .message_bus()
            .ok_or_else(|| self.unsupported("messageBus"))?;
        bus.subscribe(topic, listener, options).await
    }

    pub async fn unsubscribe(&self, subscription: &MessageBusSubscription) -> Result<()> {
        self.ensure_ready("unsubscribe")?;
        let backend = self.inner.backend.read().await;
        let bus = backend
            .message_bus()
            .ok_or_else(|| self.unsupported("messageBus"))?;
        bus.unsubscribe(subscription).await
    }

    pub async fn publish(
        &self,
        topic: &str,
        message: Value,
        options: Option<MessageBusOptions>,
    ) -> Result<()> {
        self.ensure_ready("publish")?;
        crate::debug_trace!("CONTAINER", "Publishing on '{}': {}", topic, message);
        let backend = self.inner.backend.read().await;
        let bus = backend
            .message_bus()
            .ok_or_else(|| self.unsupported("messageBus"))?;
        bus.publish(topic, message, options).await
    }

    // ========================================================================
    // Displays
    // ========================================================================

    pub async fn get_primary_display(&self) -> Result<Display> {
        self.ensure_ready("getPrimaryDisplay")?;
        let backend = self.inner.backend.read().await;
        let screen = backend.screen().ok_or_else(|| self.unsupported("screen"))?;
        screen.get_primary_display().await
    }

    pub async fn get_all_displays(&self) -> Result<Vec<Display>> {
        self.ensure_ready("getAllDisplays")?;
        let backend = self.inner.backend.read().await;
        let screen = backend.screen().ok_or_else(|| self.unsupported("screen"))?;
        screen.get_all_displays().await
    }

    pub async fn get_mouse_position(&self) -> Result<Point> {
        self.ensure_ready("getMousePosition")?;
        let backend = self.inner.backend.read().await;
        let screen = backend.screen().ok_or_else(|| self.unsupported("screen"))?;
        screen.get_mouse_position().await
    }

    // ========================================================================
    // Global shortcuts
    // ========================================================================

    pub async fn register_shortcut(&self, shortcut: &str, callback: ShortcutCallback) -> Result<()> {
        self.ensure_ready("registerShortcut")?;
        let backend = self.inner.backend.read().await;
        let shortcuts = backend
            .global_shortcuts()
            .ok_or_else(|| self.unsupported("globalShortcut"))?;
        shortcuts.register(shortcut, callback).await
    }

    pub async fn is_shortcut_registered(&self, shortcut: &str) -> Result<bool> {
        self.ensure_ready("isShortcutRegistered")?;
        let backend = self.inner.backend.read().await;
        let shortcuts = backend
            .global_shortcuts()
            .ok_or_else(|| self.unsupported("globalShortcut"))?;
        shortcuts.is_registered(shortcut).await
    }

    pub async fn unregister_shortcut(&self, shortcut: &str) -> Result<()> {
        self.ensure_ready("unregisterShortcut")?;
        let backend = self.inner.backend.read().await;
        let shortcuts = backend
            .global_shortcuts()
            .ok_or_else(|| self.unsupported("globalShortcut"))?;
        shortcuts.unregister(shortcut).await
    }

    pub async fn unregister_all_shortcuts(&self) -> Result<()> {
        self.ensure_ready("unregisterAllShortcuts")?;
        let backend = self.inner.backend.read().await;
        let shortcuts = backend
            .global_shortcuts()
            .ok_or_else(|| self.unsupported("globalShortcut"))?;
        shortcuts.unregister_all().await
    }

    // ========================================================================
    // Backend logger
    // ========================================================================

    /// Forward a log line to the backend's logger.
    pub async fn log(&self, level: log::Level, message: &str) -> Result<()> {
        self.ensure_ready("log")?;
        self.inner.backend.read().await.log(level, message).await
    }

    // ========================================================================
    // Layouts
    // ========================================================================

    /// Snapshot the current window tree without storing it.
    pub async fn build_layout(&self, name: &str) -> Result<PersistedWindowLayout> {
        self.ensure_ready("buildLayout")?;
        let backend = self.inner.backend.read().await;
        let windows = Self::window_tree(&backend).await?;
        let main_id = backend.main_window()?.id();
        capture_layout(name, &windows, &main_id).await
    }

    /// Capture the current window tree and store it under `name`, replacing
    /// any stored layout with that name.
    pub async fn save_layout(&self, name: &str) -> Result<PersistedWindowLayout> {
        let layout = self.build_layout(name).await?;

        let path = &self.inner.options.layouts_path;
        let mut manager = load_layouts_from(path).map_err(storage_error)?;
        manager.add(layout.clone());
        save_layouts_to(&manager, path).map_err(storage_error)?;

        crate::debug_info!(
            "LAYOUT",
            "Saved layout '{}' with {} windows",
            name,
            layout.windows.len()
        );
        self.inner.emit(ContainerEvent::LayoutSaved {
            name: layout.name.clone(),
        });
        Ok(layout)
    }

    fn stored_layouts(&self) -> Result<LayoutManager> {
        load_layouts_from(&self.inner.options.layouts_path).map_err(storage_error)
    }

    /// Every stored layout, in save order.
    pub fn get_layouts(&self) -> Result<Vec<PersistedWindowLayout>> {
        Ok(self.stored_layouts()?.to_vec())
    }

    pub fn get_layout(&self, name: &str) -> Result<Option<PersistedWindowLayout>> {
        Ok(self.stored_layouts()?.get(name).cloned())
    }

    /// Remove a stored layout. Returns `false` if no layout had that name.
    pub fn delete_layout(&self, name: &str) -> Result<bool> {
        let mut manager = self.stored_layouts()?;
        if manager.remove(name).is_none() {
            return Ok(false);
        }
        save_layouts_to(&manager, &self.inner.options.layouts_path).map_err(storage_error)?;
        crate::debug_info!("LAYOUT", "Deleted layout '{}'", name);
        Ok(true)
    }

    /// Re-create `layout`: bounds, grouping and window state.
    pub async fn load_layout(&self, layout: &PersistedWindowLayout) -> Result<LoadReport> {
        self.ensure_ready("loadLayout")?;
        let report = {
            let backend = self.inner.backend.read().await;
            let displays = match backend.screen() {
                Some(screen) => screen.get_all_displays().await.unwrap_or_else(|e| {
                    log::warn!("Restoring without display information: {e}");
                    Vec::new()
                }),
                None => Vec::new(),
            };
            restore_layout(
                &*backend,
                layout,
                &displays,
                self.inner.options.restore_min_visible,
            )
            .await?
        };

        crate::debug_info!(
            "LAYOUT",
            "Loaded layout '{}': {} windows, {} failures",
            layout.name,
            report.windows.len(),
            report.failures.len()
        );
        self.inner.emit(ContainerEvent::LayoutLoaded {
            name: layout.name.clone(),
        });
        Ok(report)
    }

    /// Load the stored layout called `name`.
    pub async fn load_layout_by_name(&self, name: &str) -> Result<LoadReport> {
        let layout = self
            .get_layout(name)?
            .ok_or_else(|| ContainerError::NotFound(format!("layout '{name}'")))?;
        self.load_layout(&layout).await
    }
}
