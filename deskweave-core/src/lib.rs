//! Core types and capability contracts for deskweave.
//!
//! This crate provides:
//! - Geometry and display value types ([`Rectangle`], [`Point`], [`Display`])
//! - The error taxonomy shared by every backend ([`ContainerError`])
//! - Capability contracts each backend adapter implements
//!   ([`ContainerWindow`], [`MessageBus`], [`ScreenManager`],
//!   [`GlobalShortcutManager`], [`Backend`])
//! - The event normalization layer ([`EventArgs`], [`WindowEventType`],
//!   [`WindowListeners`], [`EventEmitter`])
//! - The persisted layout model and window-tree traversal ([`layout`])
//! - Declarative option translation ([`options`])

pub mod backend;
pub mod bus;
pub mod display;
pub mod error;
pub mod events;
pub mod geometry;
pub mod layout;
pub mod notification;
pub mod options;
pub mod shortcuts;
pub mod window;

pub use backend::Backend;
pub use bus::{BusEvent, BusListener, MessageBus, MessageBusOptions, MessageBusSubscription};
pub use display::{Display, ScreenManager};
pub use error::{BackendError, ContainerError, Result};
pub use events::{
    EventArgs, EventEmitter, EventListener, ListenerId, Subscription, WindowEventType,
    WindowListeners,
};
pub use geometry::{Point, Rectangle};
pub use layout::{LayoutError, PersistedWindow, PersistedWindowLayout};
pub use notification::{
    MenuItem, NotificationEnvironment, NotificationHandler, NotificationOptions, TrayIconDetails,
    TrayListener,
};
pub use options::{PropertyMapping, WindowOptions, transform_properties};
pub use shortcuts::{GlobalShortcutManager, ShortcutCallback};
pub use window::{ContainerWindow, WindowState};
