//! Canonical window options and declarative property-rename tables.
//!
//! Each backend publishes a table of [`PropertyMapping`]s from canonical option
//! names to its native names. [`transform_properties`] applies such a table:
//! mapped keys are renamed, unmapped keys pass through unchanged, and keys that
//! are absent from the input never appear in the output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One rename rule: canonical option `source` becomes native option `target`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyMapping {
    pub source: &'static str,
    pub target: &'static str,
}

impl PropertyMapping {
    pub const fn new(source: &'static str, target: &'static str) -> Self {
        Self { source, target }
    }
}

/// Rename the keys of `options` according to `map`.
pub fn transform_properties(options: &Map<String, Value>, map: &[PropertyMapping]) -> Map<String, Value> {
    options
        .iter()
        .map(|(key, value)| {
            let renamed = map
                .iter()
                .find(|m| m.source == key)
                .map_or(key.as_str(), |m| m.target);
            (renamed.to_string(), value.clone())
        })
        .collect()
}

/// Canonical window creation options.
///
/// Only the fields that are set take part in translation. Options outside the
/// canonical set go into `extra` and are passed to the backend unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub always_on_top: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximizable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimizable: Option<bool>,
    /// Show the window in the taskbar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taskbar: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Center the window on screen at creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<bool>,
    /// Non-canonical options, passed through verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WindowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_bounds(mut self, bounds: crate::geometry::Rectangle) -> Self {
        self.x = Some(bounds.x);
        self.y = Some(bounds.y);
        self.width = Some(bounds.width);
        self.height = Some(bounds.height);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// The set options as a JSON object keyed by canonical names.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            // A struct of options and a string map always serializes to an object.
            _ => Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const MAP: &[PropertyMapping] = &[
        PropertyMapping::new("alwaysOnTop", "onTop"),
        PropertyMapping::new("x", "left"),
    ];

    #[test]
    fn test_only_set_fields_serialize() {
        let options = WindowOptions {
            always_on_top: Some(true),
            x: Some(10),
            ..Default::default()
        };
        let map = options.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["alwaysOnTop"], json!(true));
        assert_eq!(map["x"], json!(10));
    }

    #[test]
    fn test_transform_renames_and_passes_through() {
        let options = WindowOptions::new()
            .with_extra("frame", json!(false))
            .to_map();
        let mut options = options;
        options.insert("alwaysOnTop".into(), json!(true));

        let native = transform_properties(&options, MAP);
        assert_eq!(native["onTop"], json!(true));
        assert_eq!(native["frame"], json!(false));
        assert!(!native.contains_key("alwaysOnTop"));
        assert!(!native.contains_key("left"));
    }

    #[test]
    fn test_extra_options_flatten_on_deserialize() {
        let options: WindowOptions =
            serde_json::from_value(json!({"resizable": false, "icon": "app.png"})).unwrap();
        assert_eq!(options.resizable, Some(false));
        assert_eq!(options.extra["icon"], json!("app.png"));
    }
}
