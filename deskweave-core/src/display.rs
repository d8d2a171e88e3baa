//! Display records and the screen manager contract.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Point, Rectangle};

/// One physical or virtual monitor as reported by the backend.
///
/// Displays are enumerated fresh on every call and never mutated by deskweave;
/// the backend is the source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    pub id: String,
    pub scale_factor: f64,
    pub bounds: Rectangle,
    /// Bounds minus taskbars, docks and other reserved areas.
    pub work_area: Rectangle,
}

impl Display {
    /// Whether `point` lies on this display.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point)
    }
}

/// Pick the display a rectangle overlaps most, falling back to the first one.
pub fn best_display_for<'a>(displays: &'a [Display], rect: &Rectangle) -> Option<&'a Display> {
    displays
        .iter()
        .max_by_key(|d| d.bounds.intersection_area(rect))
        .filter(|d| d.bounds.intersection_area(rect) > 0)
        .or_else(|| displays.first())
}

/// Live monitor enumeration.
///
/// Implementations must not cache: monitor configuration can change during a
/// session.
pub trait ScreenManager: Send + Sync {
    fn get_primary_display(&self) -> impl Future<Output = Result<Display>> + Send;

    fn get_all_displays(&self) -> impl Future<Output = Result<Vec<Display>>> + Send;

    fn get_mouse_position(&self) -> impl Future<Output = Result<Point>> + Send;
}
