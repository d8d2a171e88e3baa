//! Display-aware restore logic for layouts

use deskweave_core::display::best_display_for;
use deskweave_core::{
    Backend, ContainerError, ContainerWindow, Display, PersistedWindow, PersistedWindowLayout,
    Rectangle, Result, WindowState,
};

/// Outcome of restoring a layout.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// `(saved id, live id)` for every window that exists after the restore.
    pub windows: Vec<(String, String)>,
    /// Per-window failures. The restore carries on past each of them.
    pub failures: Vec<(String, ContainerError)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Live id of the window saved as `saved_id`.
    pub fn live_id(&self, saved_id: &str) -> Option<&str> {
        self.windows
            .iter()
            .find(|(saved, _)| saved == saved_id)
            .map(|(_, live)| live.as_str())
    }
}

/// Clamp saved bounds onto the work area of the display they overlap most,
/// keeping at least `min_visible` pixels on screen. With no displays the
/// bounds are returned unchanged.
pub fn restore_bounds(saved: Rectangle, displays: &[Display], min_visible: u32) -> Rectangle {
    match best_display_for(displays, &saved) {
        Some(display) => saved.clamp_within(&display.work_area, min_visible),
        None => saved,
    }
}

/// Re-create `layout` through `backend`.
///
/// The main window is moved back to its bounds; every other window is
/// reopened from its saved options. Groups are re-joined and non-normal
/// states re-applied once all windows exist.
pub async fn restore_layout<B: Backend>(
    backend: &B,
    layout: &PersistedWindowLayout,
    displays: &[Display],
    min_visible: u32,
) -> Result<LoadReport> {
    layout.validate()?;

    let mut report = LoadReport::default();
    let mut live: Vec<(&PersistedWindow, B::Window)> = Vec::with_capacity(layout.windows.len());

    for persisted in &layout.windows {
        let bounds = restore_bounds(persisted.bounds, displays, min_visible);
        if persisted.main {
            let main = backend.main_window()?;
            if let Err(e) = main.set_bounds(bounds).await {
                report.failures.push((persisted.id.clone(), e));
            }
            live.push((persisted, main));
            continue;
        }

        let mut target = persisted.clone();
        target.bounds = bounds;
        match backend.reopen_window(&target).await {
            Ok(window) => {
                crate::debug_log!(
                    "LAYOUT",
                    "Reopened '{}' as {}",
                    persisted.id,
                    window.id()
                );
                live.push((persisted, window));
            }
            Err(e) => {
                log::warn!("Failed to reopen window '{}': {e}", persisted.id);
                report.failures.push((persisted.id.clone(), e));
            }
        }
    }

    for group in layout.groups() {
        let members: Vec<&B::Window> = group
            .iter()
            .filter_map(|id| live.iter().find(|(p, _)| &p.id == id).map(|(_, w)| w))
            .filter(|w| w.allow_grouping())
            .collect();
        let Some((anchor, rest)) = members.split_first() else {
            continue;
        };
        for member in rest {
            if let Err(e) = member.join_group(anchor).await {
                report.failures.push((member.id(), e));
            }
        }
    }

    for (persisted, window) in &live {
        if persisted.state != WindowState::Normal
            && let Err(e) = window.set_state(persisted.state).await
        {
            report.failures.push((persisted.id.clone(), e));
        }
    }

    report.windows = live
        .iter()
        .map(|(persisted, window)| (persisted.id.clone(), window.id()))
        .collect();
    Ok(report)
}
