//! In-memory Glue42 driver.
//!
//! Simulates windows (bounds, visibility, focus, state, settings, groups and
//! event sources), the bus, hotkeys, method invocation, displays and the
//! logger. Every handle shares one state table, so a test can keep a clone of
//! [`MockDesktop`] to drive events and inspect what the adapter did.
//!
//! Handlers are always invoked with the state lock released, so they may call
//! back into the driver.

use std::collections::HashMap;
use std::sync::Arc;

use deskweave_config::Glue42Features;
use deskweave_core::BackendError;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::driver::{
    DriverResult, GdBounds, GdBus, GdBusCallback, GdDesktop, GdHotkeyCallback, GdHotkeys,
    GdUnsubscribe, GdWindow, GdWindowEvent, GdWindowHandler,
};

/// Id of the window [`MockDesktop::new`] starts with.
pub const MAIN_WINDOW_ID: &str = "main";

struct WindowRecord {
    id: String,
    name: String,
    url: String,
    bounds: GdBounds,
    visible: bool,
    state: String,
    settings: Value,
    group: u64,
    flashing: bool,
}

struct HandlerRecord {
    id: u64,
    window: String,
    event: GdWindowEvent,
    handler: GdWindowHandler<MockWindow>,
}

struct BusRecord {
    id: u64,
    topic: String,
    target: Option<String>,
    callback: GdBusCallback,
    live: bool,
}

struct MockState {
    initialized: bool,
    fail_init: Option<String>,
    features: Option<Glue42Features>,
    windows: Vec<WindowRecord>,
    my_window: String,
    focused: Option<String>,
    handlers: Vec<HandlerRecord>,
    bus: Vec<BusRecord>,
    published: Vec<(String, Value, Option<String>)>,
    hotkeys: HashMap<String, GdHotkeyCallback>,
    invocations: Vec<(String, Value)>,
    logs: Vec<(String, String)>,
    displays: Vec<Value>,
    mouse: Value,
    failing_close: Vec<String>,
    next_id: u64,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&self, id: &str) -> Option<&WindowRecord> {
        self.windows.iter().find(|w| w.id == id)
    }

    fn record_mut(&mut self, id: &str) -> DriverResult<&mut WindowRecord> {
        self.windows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| BackendError::new(format!("window {id} does not exist")))
    }

    fn insert_window(&mut self, id: &str, name: &str, url: &str, bounds: GdBounds, settings: Value) {
        let group = self.next_id();
        self.windows.push(WindowRecord {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
            bounds,
            visible: true,
            state: "normal".to_string(),
            settings,
            group,
            flashing: false,
        });
    }
}

fn default_display() -> Value {
    json!({
        "id": "primary",
        "scaleFactor": 1.0,
        "bounds": {"left": 0, "top": 0, "width": 1920, "height": 1080},
        "workingArea": {"left": 0, "top": 0, "width": 1920, "height": 1040},
    })
}

type Shared = Arc<Mutex<MockState>>;

/// Collect the handlers for `(window, event)` and run them unlocked.
fn fire(state: &Shared, window: &str, event: GdWindowEvent) -> usize {
    let handlers: Vec<GdWindowHandler<MockWindow>> = state
        .lock()
        .handlers
        .iter()
        .filter(|h| h.window == window && h.event == event)
        .map(|h| Arc::clone(&h.handler))
        .collect();
    let target = MockWindow {
        id: window.to_string(),
        state: Arc::clone(state),
    };
    for handler in &handlers {
        handler(&target);
    }
    handlers.len()
}

/// The in-memory desktop.
#[derive(Clone)]
pub struct MockDesktop {
    state: Shared,
}

impl Default for MockDesktop {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDesktop {
    /// A desktop with one top-level window, [`MAIN_WINDOW_ID`], which is also
    /// the current window.
    pub fn new() -> Self {
        let mut state = MockState {
            initialized: false,
            fail_init: None,
            features: None,
            windows: Vec::new(),
            my_window: MAIN_WINDOW_ID.to_string(),
            focused: None,
            handlers: Vec::new(),
            bus: Vec::new(),
            published: Vec::new(),
            hotkeys: HashMap::new(),
            invocations: Vec::new(),
            logs: Vec::new(),
            displays: vec![default_display()],
            mouse: json!({"x": 0, "y": 0}),
            failing_close: Vec::new(),
            next_id: 0,
        };
        state.insert_window(
            MAIN_WINDOW_ID,
            MAIN_WINDOW_ID,
            "https://apps.local/main",
            GdBounds {
                left: 100,
                top: 100,
                width: 1024,
                height: 768,
            },
            json!({}),
        );
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Add a window owned by `parent` (a child window) or a top-level one.
    pub fn add_window(&self, id: &str, parent: Option<&str>) -> MockWindow {
        let settings = match parent {
            Some(parent) => json!({ "isChild": true, "parentInstanceId": parent }),
            None => json!({}),
        };
        let bounds = GdBounds {
            left: 0,
            top: 0,
            width: 400,
            height: 300,
        };
        self.state.lock().insert_window(
            id,
            id,
            &format!("https://apps.local/{id}"),
            bounds,
            settings,
        );
        self.handle(id)
    }

    fn handle(&self, id: &str) -> MockWindow {
        MockWindow {
            id: id.to_string(),
            state: Arc::clone(&self.state),
        }
    }

    /// Handle to an existing window.
    pub fn window(&self, id: &str) -> Option<MockWindow> {
        self.state.lock().record(id).map(|_| self.handle(id))
    }

    /// Ids of every open window, in creation order.
    pub fn window_ids(&self) -> Vec<String> {
        self.state.lock().windows.iter().map(|w| w.id.clone()).collect()
    }

    pub fn set_my_window(&self, id: &str) {
        self.state.lock().my_window = id.to_string();
    }

    /// Make the next `init` fail with `message`.
    pub fn fail_init(&self, message: &str) {
        self.state.lock().fail_init = Some(message.to_string());
    }

    /// Features passed to the last successful `init`.
    pub fn initialized_features(&self) -> Option<Glue42Features> {
        self.state.lock().features
    }

    /// Make `close` fail for window `id`.
    pub fn fail_close(&self, id: &str) {
        self.state.lock().failing_close.push(id.to_string());
    }

    /// Overwrite the native state string, bypassing validation.
    pub fn set_raw_state(&self, id: &str, state: &str) {
        if let Ok(record) = self.state.lock().record_mut(id) {
            record.state = state.to_string();
        }
    }

    /// Move focus to `id`, firing focus-changed on the old and new window.
    pub fn set_focused(&self, id: &str) {
        let previous = self.state.lock().focused.replace(id.to_string());
        if let Some(previous) = previous.filter(|p| p != id) {
            fire(&self.state, &previous, GdWindowEvent::FocusChanged);
        }
        fire(&self.state, id, GdWindowEvent::FocusChanged);
    }

    /// Fire a native event on `id` without changing any state.
    pub fn emit(&self, id: &str, event: GdWindowEvent) -> usize {
        fire(&self.state, id, event)
    }

    /// Live native handlers registered on `id`.
    pub fn handler_count(&self, id: &str) -> usize {
        self.state
            .lock()
            .handlers
            .iter()
            .filter(|h| h.window == id)
            .count()
    }

    /// Deliver `data` to every callback ever subscribed to `topic`, including
    /// unsubscribed ones, as a runtime with in-flight messages would.
    pub fn deliver_late(&self, topic: &str, data: Value) {
        let callbacks: Vec<GdBusCallback> = self
            .state
            .lock()
            .bus
            .iter()
            .filter(|s| s.topic == topic)
            .map(|s| Arc::clone(&s.callback))
            .collect();
        for callback in callbacks {
            callback(&data, topic);
        }
    }

    /// Every `(topic, data, target)` published so far.
    pub fn published(&self) -> Vec<(String, Value, Option<String>)> {
        self.state.lock().published.clone()
    }

    /// Simulate a hotkey press. Returns `false` if nothing is registered.
    pub fn press_hotkey(&self, hotkey: &str) -> bool {
        let callback = self.state.lock().hotkeys.get(hotkey).cloned();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    /// Every `(method, args)` invoked so far.
    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.state.lock().invocations.clone()
    }

    /// Every `(level, message)` logged so far.
    pub fn logs(&self) -> Vec<(String, String)> {
        self.state.lock().logs.clone()
    }

    pub fn add_display(&self, display: Value) {
        self.state.lock().displays.push(display);
    }

    pub fn set_displays(&self, displays: Vec<Value>) {
        self.state.lock().displays = displays;
    }

    pub fn set_mouse_position(&self, position: Value) {
        self.state.lock().mouse = position;
    }
}

impl GdDesktop for MockDesktop {
    type Window = MockWindow;
    type Bus = MockBus;
    type Hotkeys = MockHotkeys;

    async fn init(&self, features: &Glue42Features) -> DriverResult<()> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_init.take() {
            return Err(BackendError::new(message));
        }
        state.initialized = true;
        state.features = Some(*features);
        Ok(())
    }

    fn my_window(&self) -> DriverResult<MockWindow> {
        let state = self.state.lock();
        if !state.initialized {
            return Err(BackendError::new("Glue42 is not initialized"));
        }
        let id = state.my_window.clone();
        drop(state);
        Ok(self.handle(&id))
    }

    fn find_by_id(&self, id: &str) -> Option<MockWindow> {
        self.window(id)
    }

    fn list(&self) -> Vec<MockWindow> {
        self.window_ids().iter().map(|id| self.handle(id)).collect()
    }

    async fn open(&self, name: &str, url: &str, options: Value) -> DriverResult<MockWindow> {
        let mut state = self.state.lock();
        if state.windows.iter().any(|w| w.name == name) {
            return Err(BackendError::with_payload(
                format!("a window named '{name}' already exists"),
                options,
            ));
        }

        let mut settings = match options {
            Value::Object(map) => map,
            other => {
                return Err(BackendError::with_payload("window options must be an object", other));
            }
        };
        settings.insert("parentInstanceId".into(), json!(state.my_window));

        let int = |key: &str, default: i64| settings.get(key).and_then(Value::as_i64).unwrap_or(default);
        let bounds = GdBounds {
            left: int("left", 0) as i32,
            top: int("top", 0) as i32,
            width: int("width", 800).max(0) as u32,
            height: int("height", 600).max(0) as u32,
        };

        let id = format!("w{}", state.next_id());
        state.insert_window(&id, name, url, bounds, Value::Object(settings));
        drop(state);
        Ok(self.handle(&id))
    }

    fn bus(&self) -> Option<MockBus> {
        Some(MockBus {
            state: Arc::clone(&self.state),
        })
    }

    fn hotkeys(&self) -> Option<MockHotkeys> {
        Some(MockHotkeys {
            state: Arc::clone(&self.state),
        })
    }

    async fn invoke(&self, method: &str, args: Value) -> DriverResult<Value> {
        self.state
            .lock()
            .invocations
            .push((method.to_string(), args));
        Ok(json!({}))
    }

    async fn primary_display(&self) -> DriverResult<Value> {
        self.state
            .lock()
            .displays
            .first()
            .cloned()
            .ok_or_else(|| BackendError::new("no displays"))
    }

    async fn all_displays(&self) -> DriverResult<Vec<Value>> {
        Ok(self.state.lock().displays.clone())
    }

    async fn mouse_position(&self) -> DriverResult<Value> {
        Ok(self.state.lock().mouse.clone())
    }

    async fn log(&self, message: &str, level: &str) -> DriverResult<()> {
        self.state
            .lock()
            .logs
            .push((level.to_string(), message.to_string()));
        Ok(())
    }
}

/// A handle to one simulated window.
#[derive(Clone)]
pub struct MockWindow {
    id: String,
    state: Shared,
}

impl MockWindow {
    fn read<T>(&self, f: impl FnOnce(&WindowRecord) -> T, default: T) -> T {
        self.state.lock().record(&self.id).map_or(default, f)
    }

    fn update(&self, f: impl FnOnce(&mut WindowRecord)) -> DriverResult<()> {
        let mut state = self.state.lock();
        f(state.record_mut(&self.id)?);
        Ok(())
    }

    fn set_state(&self, value: &str, event: GdWindowEvent) -> DriverResult<()> {
        self.update(|w| w.state = value.to_string())?;
        fire(&self.state, &self.id, event);
        Ok(())
    }

    pub fn is_flashing(&self) -> bool {
        self.read(|w| w.flashing, false)
    }
}

impl GdWindow for MockWindow {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> String {
        self.read(|w| w.name.clone(), String::new())
    }

    fn url(&self) -> String {
        self.read(|w| w.url.clone(), String::new())
    }

    fn bounds(&self) -> GdBounds {
        self.read(|w| w.bounds, GdBounds::default())
    }

    fn is_visible(&self) -> bool {
        self.read(|w| w.visible, false)
    }

    fn is_focused(&self) -> bool {
        self.state.lock().focused.as_deref() == Some(self.id.as_str())
    }

    fn state(&self) -> String {
        self.read(|w| w.state.clone(), String::new())
    }

    fn settings(&self) -> Value {
        self.read(|w| w.settings.clone(), json!({}))
    }

    fn group_members(&self) -> Vec<Self> {
        let state = self.state.lock();
        let Some(group) = state.record(&self.id).map(|w| w.group) else {
            return Vec::new();
        };
        state
            .windows
            .iter()
            .filter(|w| w.group == group)
            .map(|w| MockWindow {
                id: w.id.clone(),
                state: Arc::clone(&self.state),
            })
            .collect()
    }

    async fn navigate(&self, url: &str) -> DriverResult<()> {
        self.update(|w| w.url = url.to_string())
    }

    async fn focus(&self) -> DriverResult<()> {
        self.update(|_| {})?;
        MockDesktop {
            state: Arc::clone(&self.state),
        }
        .set_focused(&self.id);
        Ok(())
    }

    async fn set_visible(&self, visible: bool) -> DriverResult<()> {
        self.update(|w| w.visible = visible)
    }

    async fn close(&self) -> DriverResult<()> {
        {
            let state = self.state.lock();
            if state.failing_close.contains(&self.id) {
                return Err(BackendError::new(format!("window {} refused to close", self.id)));
            }
            if state.record(&self.id).is_none() {
                return Err(BackendError::new(format!("window {} does not exist", self.id)));
            }
        }
        fire(&self.state, &self.id, GdWindowEvent::Closing);
        let mut state = self.state.lock();
        state.windows.retain(|w| w.id != self.id);
        state.handlers.retain(|h| h.window != self.id);
        if state.focused.as_deref() == Some(self.id.as_str()) {
            state.focused = None;
        }
        Ok(())
    }

    async fn minimize(&self) -> DriverResult<()> {
        self.set_state("minimized", GdWindowEvent::Minimized)
    }

    async fn maximize(&self) -> DriverResult<()> {
        self.set_state("maximized", GdWindowEvent::Maximized)
    }

    async fn restore(&self) -> DriverResult<()> {
        self.set_state("normal", GdWindowEvent::Normal)
    }

    async fn maximize_restore(&self) -> DriverResult<()> {
        self.set_state("normal", GdWindowEvent::Normal)
    }

    async fn capture(&self) -> DriverResult<String> {
        self.update(|_| {})?;
        Ok(format!("data:image/png;base64,{}", self.id))
    }

    async fn flash(&self, enable: bool) -> DriverResult<()> {
        self.update(|w| w.flashing = enable)
    }

    async fn move_resize(&self, bounds: GdBounds) -> DriverResult<()> {
        self.update(|w| w.bounds = bounds)?;
        fire(&self.state, &self.id, GdWindowEvent::BoundsChanged);
        Ok(())
    }

    async fn snap(&self, target: &Self) -> DriverResult<()> {
        let mut state = self.state.lock();
        let group = state.record_mut(&target.id)?.group;
        state.record_mut(&self.id)?.group = group;
        Ok(())
    }

    async fn ungroup(&self) -> DriverResult<()> {
        let mut state = self.state.lock();
        let group = state.next_id();
        state.record_mut(&self.id)?.group = group;
        Ok(())
    }

    async fn activate(&self) -> DriverResult<()> {
        self.focus().await
    }

    fn on(&self, event: GdWindowEvent, handler: GdWindowHandler<Self>) -> GdUnsubscribe {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.handlers.push(HandlerRecord {
            id,
            window: self.id.clone(),
            event,
            handler,
        });
        let shared = Arc::clone(&self.state);
        Box::new(move || shared.lock().handlers.retain(|h| h.id != id))
    }
}

/// Handle to the simulated bus.
#[derive(Clone)]
pub struct MockBus {
    state: Shared,
}

impl GdBus for MockBus {
    type Handle = u64;

    async fn subscribe(
        &self,
        topic: &str,
        callback: GdBusCallback,
        target: Option<String>,
    ) -> DriverResult<u64> {
        let mut state = self.state.lock();
        let id = state.next_id();
        state.bus.push(BusRecord {
            id,
            topic: topic.to_string(),
            target,
            callback,
            live: true,
        });
        Ok(id)
    }

    async fn unsubscribe(&self, handle: u64) -> DriverResult<()> {
        let mut state = self.state.lock();
        match state.bus.iter_mut().find(|s| s.id == handle && s.live) {
            Some(record) => {
                record.live = false;
                Ok(())
            }
            None => Err(BackendError::new(format!("unknown bus handle {handle}"))),
        }
    }

    async fn publish(&self, topic: &str, data: Value, target: Option<String>) -> DriverResult<()> {
        let callbacks: Vec<GdBusCallback> = {
            let mut state = self.state.lock();
            state
                .published
                .push((topic.to_string(), data.clone(), target.clone()));
            state
                .bus
                .iter()
                .filter(|s| s.live && s.topic == topic)
                .filter(|s| match (&target, &s.target) {
                    (Some(wanted), Some(own)) => wanted == own,
                    _ => true,
                })
                .map(|s| Arc::clone(&s.callback))
                .collect()
        };
        for callback in callbacks {
            callback(&data, topic);
        }
        Ok(())
    }
}

/// Handle to the simulated hotkeys API.
#[derive(Clone)]
pub struct MockHotkeys {
    state: Shared,
}

impl GdHotkeys for MockHotkeys {
    async fn register(&self, hotkey: &str, callback: GdHotkeyCallback) -> DriverResult<()> {
        self.state
            .lock()
            .hotkeys
            .insert(hotkey.to_string(), callback);
        Ok(())
    }

    async fn is_registered(&self, hotkey: &str) -> DriverResult<bool> {
        Ok(self.state.lock().hotkeys.contains_key(hotkey))
    }

    async fn unregister(&self, hotkey: &str) -> DriverResult<()> {
        self.state.lock().hotkeys.remove(hotkey);
        Ok(())
    }

    async fn unregister_all(&self) -> DriverResult<()> {
        self.state.lock().hotkeys.clear();
        Ok(())
    }
}
