//! Event normalization layer.
//!
//! Backends disagree about which window events exist and what their payloads
//! look like. This module defines the canonical vocabulary every adapter
//! translates into:
//!
//! - [`WindowEventType`]: the fixed set of canonical window events
//! - [`EventArgs`]: the only shape ever delivered to application listeners
//! - [`Subscription`]: an RAII handle for one backend subscription
//! - [`WindowListeners`]: the per-window table enforcing one backend
//!   subscription per `(window, event)` pair
//! - [`EventEmitter`]: multi-listener fan-out for container-level events
//!
//! Listener invocations are isolated: a panicking listener is logged and the
//! remaining listeners still run.

use std::collections::HashMap;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Canonical events
// ---------------------------------------------------------------------------

/// Canonical, backend-independent window events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowEventType {
    Move,
    Resize,
    Close,
    Focus,
    Blur,
    Maximize,
    Minimize,
    Restore,
}

impl WindowEventType {
    /// Every canonical event, in declaration order.
    pub const ALL: &'static [WindowEventType] = &[
        WindowEventType::Move,
        WindowEventType::Resize,
        WindowEventType::Close,
        WindowEventType::Focus,
        WindowEventType::Blur,
        WindowEventType::Maximize,
        WindowEventType::Minimize,
        WindowEventType::Restore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowEventType::Move => "move",
            WindowEventType::Resize => "resize",
            WindowEventType::Close => "close",
            WindowEventType::Focus => "focus",
            WindowEventType::Blur => "blur",
            WindowEventType::Maximize => "maximize",
            WindowEventType::Minimize => "minimize",
            WindowEventType::Restore => "restore",
        }
    }

    /// Parse a canonical event name (case-insensitive).
    ///
    /// Returns `None` for names outside the canonical set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for WindowEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowEventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown window event '{s}'"))
    }
}

/// The canonical event shape delivered to every listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventArgs {
    /// Id of the window (or container) that raised the event.
    pub sender: String,
    /// Canonical event name or bus topic.
    pub name: String,
    /// Normalized payload. Never a backend-native object.
    pub inner_event: Value,
}

impl EventArgs {
    pub fn new(sender: impl Into<String>, name: impl Into<String>, inner_event: Value) -> Self {
        Self {
            sender: sender.into(),
            name: name.into(),
            inner_event,
        }
    }

    pub fn window(sender: impl Into<String>, event: WindowEventType, inner_event: Value) -> Self {
        Self::new(sender, event.as_str(), inner_event)
    }

    /// The canonical window event this carries, if the name is one.
    pub fn event_type(&self) -> Option<WindowEventType> {
        WindowEventType::from_name(&self.name)
    }
}

/// Application-side listener for window events.
pub type EventListener = Arc<dyn Fn(&EventArgs) + Send + Sync>;

/// Invoke `f`, containing a panic so it cannot abort the surrounding delivery.
///
/// Returns `false` if the listener panicked.
pub fn invoke_isolated(context: &str, f: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            log::error!("Listener for '{context}' panicked: {reason}");
            false
        }
    }
}

/// Deliver one normalized event to a window listener.
pub fn dispatch(listener: &EventListener, args: &EventArgs) -> bool {
    invoke_isolated(&args.name, || listener(args))
}

// ---------------------------------------------------------------------------
// Backend subscriptions
// ---------------------------------------------------------------------------

type CancelFn = Box<dyn FnOnce() + Send + Sync>;

/// Handle to one live backend subscription.
///
/// Dropping the handle (or calling [`Subscription::cancel`]) unsubscribes from
/// the backend exactly once.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<CancelFn>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to release on the backend side.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Per-window listener table
// ---------------------------------------------------------------------------

/// Outcome of [`WindowListeners::attach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    /// No listener was registered for the event before.
    Attached,
    /// A previous registration was unsubscribed and replaced.
    Replaced,
}

struct Registration {
    listener: EventListener,
    subscription: Subscription,
}

/// Per-window table mapping canonical events to backend subscriptions.
///
/// Attaching follows the *replace* policy: there is never more than one
/// backend subscription per canonical event, so attaching the same (or a
/// different) listener twice never double-fires.
#[derive(Default)]
pub struct WindowListeners {
    entries: HashMap<WindowEventType, Registration>,
}

impl WindowListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event`, creating the backend subscription via
    /// `subscribe`.
    ///
    /// Any previous registration for `event` is unsubscribed *before*
    /// `subscribe` runs, so the backend never holds two handlers for the pair.
    pub fn attach<F>(
        &mut self,
        event: WindowEventType,
        listener: EventListener,
        subscribe: F,
    ) -> AttachOutcome
    where
        F: FnOnce(EventListener) -> Subscription,
    {
        let outcome = match self.entries.remove(&event) {
            Some(previous) => {
                previous.subscription.cancel();
                AttachOutcome::Replaced
            }
            None => AttachOutcome::Attached,
        };

        let subscription = subscribe(Arc::clone(&listener));
        self.entries.insert(
            event,
            Registration {
                listener,
                subscription,
            },
        );
        outcome
    }

    /// Remove the registration for `event` if `listener` is the attached one.
    ///
    /// Returns `true` if a backend subscription was released. Detaching when
    /// nothing (or a different listener) is registered is a no-op.
    pub fn detach(&mut self, event: WindowEventType, listener: &EventListener) -> bool {
        let matches = self
            .entries
            .get(&event)
            .is_some_and(|reg| Arc::ptr_eq(&reg.listener, listener));
        if !matches {
            return false;
        }
        if let Some(reg) = self.entries.remove(&event) {
            reg.subscription.cancel();
        }
        true
    }

    /// Release every backend subscription.
    pub fn detach_all(&mut self) {
        for (_, reg) in self.entries.drain() {
            reg.subscription.cancel();
        }
    }

    pub fn is_attached(&self, event: WindowEventType) -> bool {
        self.entries.contains_key(&event)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for WindowListeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// ---------------------------------------------------------------------------
// Multi-listener emitter
// ---------------------------------------------------------------------------

/// Identifier returned by [`EventEmitter::add_listener`].
pub type ListenerId = u64;

type EmitterListener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Fan-out of one event type to any number of listeners.
///
/// Listeners are invoked in registration order on the emitting thread; a
/// panicking listener does not prevent delivery to the others.
pub struct EventEmitter<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, EmitterListener<E>)>>,
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn add_listener(&self, listener: impl Fn(&E) + Send + Sync + 'static) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Deliver `event` to every listener. Returns how many completed normally.
    pub fn emit(&self, context: &str, event: &E) -> usize {
        // Snapshot so listeners may add/remove listeners while being called.
        let snapshot: Vec<EmitterListener<E>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        snapshot
            .iter()
            .filter(|listener| invoke_isolated(context, || listener(event)))
            .count()
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn counting_listener(counter: &Arc<AtomicUsize>) -> EventListener {
        let counter = Arc::clone(counter);
        Arc::new(move |_args: &EventArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_event_names_roundtrip() {
        for event in WindowEventType::ALL {
            assert_eq!(WindowEventType::from_name(event.as_str()), Some(*event));
        }
        assert_eq!(WindowEventType::from_name("FOCUS"), Some(WindowEventType::Focus));
        assert_eq!(WindowEventType::from_name("hover"), None);
        assert!("hover".parse::<WindowEventType>().is_err());
    }

    #[test]
    fn test_event_args_serialized_shape() {
        let args = EventArgs::window("w1", WindowEventType::Move, json!({"x": 1}));
        let value = serde_json::to_value(&args).unwrap();
        assert_eq!(
            value,
            json!({"sender": "w1", "name": "move", "innerEvent": {"x": 1}})
        );
        assert_eq!(args.event_type(), Some(WindowEventType::Move));
    }

    #[test]
    fn test_subscription_cancels_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        {
            let released = Arc::clone(&released);
            let _sub = Subscription::new(move || {
                released.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_attach_twice_replaces_backend_subscription() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::new(AtomicUsize::new(0));
        let listener = counting_listener(&counter);
        let mut table = WindowListeners::new();

        let make_sub = |released: &Arc<AtomicUsize>| {
            let released = Arc::clone(released);
            move |_l: EventListener| {
                Subscription::new(move || {
                    released.fetch_add(1, Ordering::SeqCst);
                })
            }
        };

        let first = table.attach(
            WindowEventType::Move,
            Arc::clone(&listener),
            make_sub(&released),
        );
        let second = table.attach(
            WindowEventType::Move,
            Arc::clone(&listener),
            make_sub(&released),
        );

        assert_eq!(first, AttachOutcome::Attached);
        assert_eq!(second, AttachOutcome::Replaced);
        assert_eq!(table.len(), 1);
        // The first backend subscription was released by the replacement.
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_detach_without_registration_is_noop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let listener = counting_listener(&counter);
        let mut table = WindowListeners::new();
        assert!(!table.detach(WindowEventType::Close, &listener));
        assert!(table.is_empty());
    }

    #[test]
    fn test_detach_ignores_foreign_listener() {
        let counter = Arc::new(AtomicUsize::new(0));
        let attached = counting_listener(&counter);
        let other = counting_listener(&counter);
        let mut table = WindowListeners::new();
        table.attach(WindowEventType::Focus, Arc::clone(&attached), |_| {
            Subscription::detached()
        });

        assert!(!table.detach(WindowEventType::Focus, &other));
        assert!(table.is_attached(WindowEventType::Focus));
        assert!(table.detach(WindowEventType::Focus, &attached));
        assert!(!table.is_attached(WindowEventType::Focus));
    }

    #[test]
    fn test_detach_all_releases_everything() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::new(AtomicUsize::new(0));
        let listener = counting_listener(&counter);
        let mut table = WindowListeners::new();
        for event in [WindowEventType::Move, WindowEventType::Resize] {
            let released = Arc::clone(&released);
            table.attach(event, Arc::clone(&listener), move |_| {
                Subscription::new(move || {
                    released.fetch_add(1, Ordering::SeqCst);
                })
            });
        }
        table.detach_all();
        assert!(table.is_empty());
        assert_eq!(released.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_dispatch_contains_panics() {
        let listener: EventListener = Arc::new(|_args: &EventArgs| panic!("boom"));
        let args = EventArgs::window("w", WindowEventType::Close, Value::Null);
        assert!(!dispatch(&listener, &args));
    }

    #[test]
    fn test_emitter_isolates_panicking_listener() {
        let emitter: EventEmitter<u32> = EventEmitter::new();
        let seen = Arc::new(AtomicUsize::new(0));

        emitter.add_listener(|_| panic!("first listener fails"));
        let seen_clone = Arc::clone(&seen);
        emitter.add_listener(move |value| {
            seen_clone.fetch_add(*value as usize, Ordering::SeqCst);
        });

        let completed = emitter.emit("test", &5);
        assert_eq!(completed, 1);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_emitter_remove_listener() {
        let emitter: EventEmitter<()> = EventEmitter::new();
        let id = emitter.add_listener(|_| {});
        assert_eq!(emitter.listener_count(), 1);
        assert!(emitter.remove_listener(id));
        assert!(!emitter.remove_listener(id));
        assert_eq!(emitter.emit("test", &()), 0);
    }
}
