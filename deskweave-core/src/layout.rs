//! Window grouping and layout engine.
//!
//! - [`PersistedWindowLayout`] / [`PersistedWindow`]: the persisted layout
//!   format. Field names are part of the compatibility surface.
//! - [`collect_window_tree`]: depth-first walk of the ownership tree from the
//!   main window, used for both window enumeration and layout capture.
//! - [`find_root`]: bounded owner-chain walk to the top-most ancestor.
//! - [`capture_layout`]: snapshot every visited window.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;
use crate::geometry::Rectangle;
use crate::window::{ContainerWindow, WindowState};

/// Upper bound on owner-chain length; deeper chains are treated as malformed.
pub const MAX_OWNER_DEPTH: usize = 64;

/// Snapshot of one window inside a layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedWindow {
    pub id: String,
    pub name: String,
    pub url: String,
    pub bounds: Rectangle,
    /// Ids of the other members of this window's group at capture time.
    #[serde(default)]
    pub group: Vec<String>,
    /// Backend-specific creation options (opaque).
    #[serde(default)]
    pub options: Value,
    #[serde(default)]
    pub state: WindowState,
    #[serde(default)]
    pub main: bool,
}

/// A named snapshot of window positions, state and topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedWindowLayout {
    pub name: String,
    #[serde(default)]
    pub windows: Vec<PersistedWindow>,
}

/// Structural problems in a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Exactly one window must be flagged as main.
    #[error("layout '{layout}' has {count} main windows, expected exactly one")]
    MainWindowCount { layout: String, count: usize },

    /// Window ids must be unique within a layout.
    #[error("layout '{layout}' contains window id '{id}' more than once")]
    DuplicateWindow { layout: String, id: String },
}

impl PersistedWindowLayout {
    pub fn new(name: impl Into<String>, windows: Vec<PersistedWindow>) -> Self {
        Self {
            name: name.into(),
            windows,
        }
    }

    pub fn main_window(&self) -> Option<&PersistedWindow> {
        self.windows.iter().find(|w| w.main)
    }

    pub fn window(&self, id: &str) -> Option<&PersistedWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    /// Check the exactly-one-main and unique-id invariants.
    pub fn validate(&self) -> std::result::Result<(), LayoutError> {
        let count = self.windows.iter().filter(|w| w.main).count();
        if count != 1 {
            return Err(LayoutError::MainWindowCount {
                layout: self.name.clone(),
                count,
            });
        }

        let mut seen = HashSet::new();
        for window in &self.windows {
            if !seen.insert(window.id.as_str()) {
                return Err(LayoutError::DuplicateWindow {
                    layout: self.name.clone(),
                    id: window.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Distinct groups (each with two or more members) recorded in the layout,
    /// as sorted id lists in first-appearance order.
    pub fn groups(&self) -> Vec<Vec<String>> {
        let mut groups: Vec<Vec<String>> = Vec::new();
        for window in self.windows.iter().filter(|w| !w.group.is_empty()) {
            let mut members: Vec<String> = window.group.clone();
            members.push(window.id.clone());
            members.sort();
            members.dedup();
            if !groups.contains(&members) {
                groups.push(members);
            }
        }
        groups
    }
}

/// Walk the ownership tree depth-first starting at `main`.
///
/// A candidate is reachable when its owner id matches a window that was
/// already collected. Children are visited in candidate order, each window at
/// most once, so the result is deterministic and free of duplicates even if
/// the backend reports cycles or the same window twice.
pub fn collect_window_tree<W: ContainerWindow>(main: W, candidates: Vec<W>) -> Vec<W> {
    let mut by_owner: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        if let Some(owner) = candidate.owner_id() {
            by_owner.entry(owner).or_default().push(index);
        }
    }

    let mut slots: Vec<Option<W>> = candidates.into_iter().map(Some).collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut result = Vec::new();
    let mut stack = vec![main];

    while let Some(window) = stack.pop() {
        let id = window.id();
        if !visited.insert(id.clone()) {
            continue;
        }

        if let Some(children) = by_owner.get(&id) {
            // Reverse so the first child is popped (visited) first.
            for &index in children.iter().rev() {
                if let Some(child) = slots[index].take()
                    && !visited.contains(&child.id())
                {
                    stack.push(child);
                }
            }
        }
        result.push(window);
    }

    result
}

/// Follow owner links from `start` up to the top-most ancestor.
///
/// The walk stops at a window without an owner, at an owner `lookup` cannot
/// resolve, on a cycle, or after [`MAX_OWNER_DEPTH`] steps; in each of the
/// abnormal cases the last resolved window is returned.
pub fn find_root<N>(
    start: N,
    id_of: impl Fn(&N) -> String,
    owner_of: impl Fn(&N) -> Option<String>,
    lookup: impl Fn(&str) -> Option<N>,
) -> N {
    let mut visited = HashSet::new();
    let mut current = start;
    visited.insert(id_of(&current));

    for _ in 0..MAX_OWNER_DEPTH {
        let Some(owner_id) = owner_of(&current) else {
            return current;
        };
        if visited.contains(&owner_id) {
            log::warn!("Owner cycle detected at window '{owner_id}'");
            return current;
        }
        let Some(owner) = lookup(&owner_id) else {
            log::warn!("Owner window '{owner_id}' not found; using its child as root");
            return current;
        };
        visited.insert(owner_id);
        current = owner;
    }

    log::warn!("Owner chain exceeds {MAX_OWNER_DEPTH} windows; stopping");
    current
}

/// Snapshot one window. `main_id` decides the `main` flag.
pub async fn capture_window<W: ContainerWindow>(window: &W, main_id: &str) -> Result<PersistedWindow> {
    let id = window.id();

    let group = if window.allow_grouping() {
        window
            .get_group()
            .await?
            .iter()
            .map(|member| member.id())
            .filter(|member_id| *member_id != id)
            .collect()
    } else {
        Vec::new()
    };

    Ok(PersistedWindow {
        main: id == main_id,
        name: window.name(),
        url: window.url(),
        bounds: window.get_bounds().await?,
        options: window.get_options().await?,
        state: window.get_state().await?,
        group,
        id,
    })
}

/// Snapshot every window in `windows` into a layout named `name`.
pub async fn capture_layout<W: ContainerWindow>(
    name: impl Into<String>,
    windows: &[W],
    main_id: &str,
) -> Result<PersistedWindowLayout> {
    let mut persisted = Vec::with_capacity(windows.len());
    for window in windows {
        persisted.push(capture_window(window, main_id).await?);
    }
    Ok(PersistedWindowLayout::new(name, persisted))
}
