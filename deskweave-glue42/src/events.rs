//! Translation between canonical window events and Glue42 event sources.
//!
//! | canonical            | Glue42 source    | delivered when          |
//! |----------------------|------------------|-------------------------|
//! | `move`, `resize`     | `BoundsChanged`  | always                  |
//! | `focus`              | `FocusChanged`   | window is focused       |
//! | `blur`               | `FocusChanged`   | window is not focused   |
//! | `close`              | `Closing`        | always                  |
//! | `maximize`           | `Maximized`      | always                  |
//! | `minimize`           | `Minimized`      | always                  |
//! | `restore`            | `Normal`         | always                  |

use deskweave_core::{EventArgs, Rectangle, WindowEventType};
use serde_json::{Value, json};

use crate::driver::{GdBounds, GdWindow, GdWindowEvent};

/// Native event source backing a canonical event.
pub fn native_event(event: WindowEventType) -> GdWindowEvent {
    match event {
        WindowEventType::Move | WindowEventType::Resize => GdWindowEvent::BoundsChanged,
        WindowEventType::Focus | WindowEventType::Blur => GdWindowEvent::FocusChanged,
        WindowEventType::Close => GdWindowEvent::Closing,
        WindowEventType::Maximize => GdWindowEvent::Maximized,
        WindowEventType::Minimize => GdWindowEvent::Minimized,
        WindowEventType::Restore => GdWindowEvent::Normal,
    }
}

pub fn to_rectangle(bounds: GdBounds) -> Rectangle {
    Rectangle::new(bounds.left, bounds.top, bounds.width, bounds.height)
}

pub fn to_gd_bounds(rect: Rectangle) -> GdBounds {
    GdBounds {
        left: rect.x,
        top: rect.y,
        width: rect.width,
        height: rect.height,
    }
}

/// Build the canonical event for a native delivery on `window`.
///
/// Returns `None` when the delivery does not apply to `event` (a focus change
/// that lost focus is not a `focus` event).
pub fn translate<W: GdWindow>(event: WindowEventType, window: &W) -> Option<EventArgs> {
    let inner: Value = match event {
        WindowEventType::Move | WindowEventType::Resize => {
            json!({ "bounds": to_rectangle(window.bounds()) })
        }
        WindowEventType::Focus | WindowEventType::Blur => {
            let focused = window.is_focused();
            if focused != (event == WindowEventType::Focus) {
                return None;
            }
            json!({ "focused": focused })
        }
        WindowEventType::Close => json!({}),
        WindowEventType::Maximize | WindowEventType::Minimize | WindowEventType::Restore => {
            json!({ "state": window.state() })
        }
    };
    Some(EventArgs::window(window.id(), event, inner))
}
