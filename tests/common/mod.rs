//! Shared integration test helpers for deskweave.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::TestContext;
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers are used per file.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use deskweave::{Container, ContainerOptions, Glue42Container, Glue42Features, NotificationHub};
use deskweave_glue42::mock::MockDesktop;
use tempfile::TempDir;

pub type MockContainer = Container<Glue42Container<MockDesktop>>;

/// A mock desktop, a container over it and a temp dir holding its layouts.
///
/// The `TempDir` is removed when the context is dropped.
pub struct TestContext {
    pub dir: TempDir,
    pub desktop: MockDesktop,
    pub hub: Arc<NotificationHub>,
    pub container: MockContainer,
}

impl TestContext {
    /// A context whose container is not connected yet.
    pub fn new() -> Self {
        Self::with_desktop(MockDesktop::new())
    }

    pub fn with_desktop(desktop: MockDesktop) -> Self {
        Self::build(desktop, Glue42Features::default())
    }

    pub fn with_features(features: Glue42Features) -> Self {
        Self::build(MockDesktop::new(), features)
    }

    fn build(desktop: MockDesktop, features: Glue42Features) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let options = ContainerOptions::default().with_layouts_path(dir.path().join("layouts.yaml"));
        let hub = Arc::new(NotificationHub::new());
        let backend = Glue42Container::new(desktop.clone(), features);
        let container = Container::with_environment(backend, options, hub.clone());
        Self {
            dir,
            desktop,
            hub,
            container,
        }
    }

    /// A context whose container is already `Ready`.
    pub async fn connected() -> Self {
        let ctx = Self::new();
        ctx.container.connect().await.expect("connect failed");
        ctx
    }

    pub fn layouts_path(&self) -> PathBuf {
        self.dir.path().join("layouts.yaml")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Let tasks spawned by event handlers run to completion.
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
