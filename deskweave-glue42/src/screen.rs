//! [`ScreenManager`] over the Glue42 `displays` API.
//!
//! Display records are translated on every call; nothing is cached.

use std::sync::Arc;

use deskweave_core::{BackendError, Display, Point, Result, ScreenManager};
use serde::Deserialize;
use serde_json::Value;

use crate::driver::{GdBounds, GdDesktop};
use crate::events::to_rectangle;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GdDisplay {
    id: Value,
    scale_factor: f64,
    bounds: GdBounds,
    working_area: GdBounds,
}

#[derive(Deserialize)]
struct GdPoint {
    x: i32,
    y: i32,
}

/// Translate one raw display record. The record is attached to the error when
/// it cannot be read.
pub fn translate_display(raw: Value) -> Result<Display> {
    let display: GdDisplay = match serde_json::from_value(raw.clone()) {
        Ok(display) => display,
        Err(e) => {
            return Err(
                BackendError::with_payload(format!("invalid display record: {e}"), raw).into(),
            );
        }
    };

    let id = match &display.id {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => {
            return Err(BackendError::with_payload("display record has no usable id", raw).into());
        }
    };

    Ok(Display {
        id,
        scale_factor: display.scale_factor,
        bounds: to_rectangle(display.bounds),
        work_area: to_rectangle(display.working_area),
    })
}

pub struct Glue42DisplayManager<D: GdDesktop> {
    desktop: Arc<D>,
}

impl<D: GdDesktop> Glue42DisplayManager<D> {
    pub fn new(desktop: Arc<D>) -> Self {
        Self { desktop }
    }
}

impl<D: GdDesktop> ScreenManager for Glue42DisplayManager<D> {
    async fn get_primary_display(&self) -> Result<Display> {
        translate_display(self.desktop.primary_display().await?)
    }

    async fn get_all_displays(&self) -> Result<Vec<Display>> {
        self.desktop
            .all_displays()
            .await?
            .into_iter()
            .map(translate_display)
            .collect()
    }

    async fn get_mouse_position(&self) -> Result<Point> {
        let raw = self.desktop.mouse_position().await?;
        match serde_json::from_value::<GdPoint>(raw.clone()) {
            Ok(point) => Ok(Point::new(point.x, point.y)),
            Err(e) => {
                Err(BackendError::with_payload(format!("invalid mouse position: {e}"), raw).into())
            }
        }
    }
}
