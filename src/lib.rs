//! deskweave: one window/container API over desktop container runtimes.
//!
//! The [`Container`] Facade drives any [`Backend`]; `deskweave-glue42`
//! provides the Glue42 adapter. Layouts are captured from the live window
//! tree, stored as YAML and restored onto the current displays.
//!
// # Mutex Usage Policy
//
//   - `tokio::sync::RwLock`   : the backend inside a container. Held across
//                               awaits while an operation talks to the runtime.
//   - `parking_lot` locks     : sync-only state (lifecycle state, listener
//                               tables, replaced notification handler). Never
//                               held across an await point.

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod container;
pub mod layouts;
pub mod notifications;

pub use container::{CloseReport, Container, ContainerEvent, ContainerOptions, ContainerState};
pub use deskweave_config::{Config, Glue42Features};
pub use deskweave_core::{
    Backend, ContainerError, ContainerWindow, Display, EventArgs, MessageBusOptions,
    MessageBusSubscription, NotificationOptions, PersistedWindow, PersistedWindowLayout, Point,
    Rectangle, Result, WindowEventType, WindowOptions, WindowState,
};
pub use deskweave_glue42::{GdDesktop, Glue42Container};
pub use layouts::LayoutManager;
pub use layouts::restore::LoadReport;
pub use notifications::NotificationHub;

/// A container over the Glue42 runtime reached through `desktop`.
pub fn glue42<D: GdDesktop>(desktop: D, config: &Config) -> Container<Glue42Container<D>> {
    Container::from_config(Glue42Container::from_config(desktop, config), config)
}
