use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Glue42 APIs requested when the backend connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Glue42Features {
    pub windows: bool,
    /// Method invocation (used to raise notifications).
    pub agm: bool,
    pub bus: bool,
    pub hotkeys: bool,
    pub logger: bool,
}

impl Default for Glue42Features {
    fn default() -> Self {
        Self {
            windows: true,
            agm: true,
            bus: true,
            hotkeys: true,
            logger: true,
        }
    }
}

/// Container configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Replace the environment's notification entry point with one routed
    /// through the backend when the backend lacks native notifications.
    pub replace_notification_api: bool,

    /// Close child windows before the main window when the container shuts
    /// down.
    pub close_children_first: bool,

    /// Override for the layout store location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layouts_file: Option<PathBuf>,

    /// Minimum number of pixels of a restored window kept on a display.
    pub restore_min_visible: u32,

    pub glue42: Glue42Features,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            replace_notification_api: true,
            close_children_first: true,
            layouts_file: None,
            restore_min_visible: 100,
            glue42: Glue42Features::default(),
        }
    }
}

impl Config {
    /// Path of the layout store, honouring `layouts_file`.
    pub fn layouts_path(&self) -> PathBuf {
        self.layouts_file
            .clone()
            .unwrap_or_else(crate::persistence::default_layouts_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.replace_notification_api);
        assert!(config.close_children_first);
        assert_eq!(config.restore_min_visible, 100);
        assert_eq!(config.glue42, Glue42Features::default());
        assert!(config.glue42.hotkeys);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config =
            serde_yaml_ng::from_str("replace_notification_api: false\nglue42:\n  hotkeys: false\n")
                .unwrap();
        assert!(!config.replace_notification_api);
        assert!(!config.glue42.hotkeys);
        assert!(config.glue42.bus);
        assert!(config.close_children_first);
    }

    #[test]
    fn test_layouts_path_override() {
        let config = Config {
            layouts_file: Some(PathBuf::from("/tmp/layouts.yaml")),
            ..Default::default()
        };
        assert_eq!(config.layouts_path(), PathBuf::from("/tmp/layouts.yaml"));
    }
}
