//! Notification and tray surfaces.
//!
//! Some backends have no native notification concept. For those the container
//! can substitute the environment's notification entry point with one that
//! routes through the backend. The substitution is an explicit registration
//! against a [`NotificationEnvironment`] and is undone on teardown.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Options accompanying a notification title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Backend-specific extras, passed through.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotificationOptions {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Default::default()
        }
    }

    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Entry point that raises a notification: `(title, options)`.
pub type NotificationHandler = Arc<dyn Fn(&str, &NotificationOptions) + Send + Sync>;

/// The host environment whose notification entry point can be replaced.
pub trait NotificationEnvironment: Send + Sync {
    /// Install `handler` (or clear the slot with `None`) and return whatever
    /// was installed before, so the caller can put it back later.
    fn replace_notification(
        &self,
        handler: Option<NotificationHandler>,
    ) -> Option<NotificationHandler>;
}

/// Icon and hover text of a tray icon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrayIconDetails {
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// An entry in a tray or context menu.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submenu: Vec<MenuItem>,
}

/// Callback fired when a tray icon is clicked.
pub type TrayListener = Arc<dyn Fn() + Send + Sync>;
