//! Named layout collection, storage and restore planning
//!
//! Layouts capture the bounds, state, options and grouping of every window in
//! the application's ownership tree so they can be re-created later. They are
//! keyed by name (case-insensitive) and kept in save order.

pub mod restore;
pub mod storage;

use deskweave_core::PersistedWindowLayout;

/// Ordered, name-keyed collection of layouts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutManager {
    layouts: Vec<PersistedWindowLayout>,
}

impl LayoutManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_layouts(layouts: Vec<PersistedWindowLayout>) -> Self {
        let mut manager = Self::new();
        for layout in layouts {
            manager.add(layout);
        }
        manager
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.layouts
            .iter()
            .position(|l| l.name.eq_ignore_ascii_case(name))
    }

    /// Add a layout, replacing any layout with the same name in place.
    ///
    /// Returns the replaced layout.
    pub fn add(&mut self, layout: PersistedWindowLayout) -> Option<PersistedWindowLayout> {
        match self.position(&layout.name) {
            Some(index) => Some(std::mem::replace(&mut self.layouts[index], layout)),
            None => {
                self.layouts.push(layout);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PersistedWindowLayout> {
        self.position(name).map(|index| &self.layouts[index])
    }

    pub fn remove(&mut self, name: &str) -> Option<PersistedWindowLayout> {
        self.position(name).map(|index| self.layouts.remove(index))
    }

    pub fn names(&self) -> Vec<&str> {
        self.layouts.iter().map(|l| l.name.as_str()).collect()
    }

    pub fn to_vec(&self) -> Vec<PersistedWindowLayout> {
        self.layouts.clone()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}
