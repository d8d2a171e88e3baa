//! Storage utilities for layout persistence
//!
//! Layouts are stored as a YAML list in `~/.config/deskweave/layouts.yaml`
//! unless the configuration points elsewhere.

use super::LayoutManager;
use anyhow::{Context, Result};
use deskweave_core::PersistedWindowLayout;
use std::path::Path;

/// Load layouts from a specific file
///
/// A missing or empty file yields an empty collection. Layouts that fail
/// validation are skipped with a warning.
pub fn load_layouts_from(path: &Path) -> Result<LayoutManager> {
    crate::debug_info!("LAYOUT", "Loading layouts from {:?}", path);
    if !path.exists() {
        crate::debug_info!(
            "LAYOUT",
            "No layouts file found at {:?}, starting with empty layouts",
            path
        );
        return Ok(LayoutManager::new());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layouts from {:?}", path))?;

    if contents.trim().is_empty() {
        crate::debug_info!("LAYOUT", "Layouts file is empty, starting with empty layouts");
        return Ok(LayoutManager::new());
    }

    let layouts: Vec<PersistedWindowLayout> = serde_yaml_ng::from_str(&contents)
        .with_context(|| format!("Failed to parse layouts from {:?}", path))?;

    let mut valid = Vec::with_capacity(layouts.len());
    for layout in layouts {
        match layout.validate() {
            Ok(()) => {
                crate::debug_log!(
                    "LAYOUT",
                    "  - {} ({} windows)",
                    layout.name,
                    layout.windows.len()
                );
                valid.push(layout);
            }
            Err(e) => log::warn!("Skipping stored layout: {e}"),
        }
    }

    crate::debug_info!("LAYOUT", "Parsed {} layouts from {:?}", valid.len(), path);
    Ok(LayoutManager::from_layouts(valid))
}

/// Save layouts to a specific file
pub fn save_layouts_to(manager: &LayoutManager, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create layouts directory {:?}", parent))?;
    }

    let layouts = manager.to_vec();
    let contents = serde_yaml_ng::to_string(&layouts).context("Failed to serialize layouts")?;

    // Write to a temp file then rename so a crash never leaves a torn file
    let temp_path = path.with_extension("yaml.tmp");
    std::fs::write(&temp_path, contents)
        .with_context(|| format!("Failed to write layouts to {:?}", temp_path))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move layouts into place at {:?}", path))?;

    log::info!("Saved {} layouts to {:?}", layouts.len(), path);
    Ok(())
}
