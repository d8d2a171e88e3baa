//! Glue42 Desktop backend for deskweave.
//!
//! - [`driver`]: the Glue42 runtime surface the adapter talks to
//! - [`Glue42Container`]: the [`deskweave_core::Backend`] implementation
//! - [`Glue42Window`], [`Glue42MessageBus`], [`Glue42DisplayManager`],
//!   [`Glue42GlobalShortcutManager`]: capability adapters
//! - `mock`: an in-memory driver, available to tests and behind the
//!   `test-support` feature

pub mod bus;
pub mod container;
pub mod driver;
pub mod events;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod screen;
pub mod shortcuts;
pub mod window;

pub use bus::Glue42MessageBus;
pub use container::{Glue42Container, HOST_TYPE};
pub use driver::{GdBounds, GdBus, GdDesktop, GdHotkeys, GdWindow, GdWindowEvent};
pub use screen::Glue42DisplayManager;
pub use shortcuts::Glue42GlobalShortcutManager;
pub use window::Glue42Window;
