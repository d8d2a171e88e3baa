//! [`ContainerWindow`] adapter over a Glue42 window handle.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use deskweave_core::events::dispatch;
use deskweave_core::{
    BackendError, ContainerWindow, EventListener, Rectangle, Result, Subscription,
    WindowEventType, WindowListeners, WindowState,
};
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::driver::GdWindow;
use crate::events::{native_event, to_gd_bounds, to_rectangle, translate};

/// Settings key carrying the id of the window that opened this one.
pub const PARENT_INSTANCE_ID: &str = "parentInstanceId";

/// Settings key set on every window opened through the container.
pub const IS_CHILD: &str = "isChild";

/// Owner id recorded in a window's settings, if any.
pub fn parent_instance_id<W: GdWindow>(window: &W) -> Option<String> {
    window
        .settings()
        .get(PARENT_INSTANCE_ID)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Whether the window was opened as a child of the application.
pub fn is_child<W: GdWindow>(window: &W) -> bool {
    window
        .settings()
        .get(IS_CHILD)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Glue42 groups are reported per window; walk them breadth-first so the
/// result is the full, symmetric membership starting with `start`.
fn group_closure<W: GdWindow>(start: &W) -> Vec<W> {
    let mut seen = HashSet::new();
    let mut members = Vec::new();
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(window) = queue.pop_front() {
        if !seen.insert(window.id()) {
            continue;
        }
        for member in window.group_members() {
            if !seen.contains(&member.id()) {
                queue.push_back(member);
            }
        }
        members.push(window);
    }
    members
}

/// A Glue42 window.
pub struct Glue42Window<W: GdWindow> {
    inner: W,
    listeners: Mutex<WindowListeners>,
}

impl<W: GdWindow> Glue42Window<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            listeners: Mutex::new(WindowListeners::new()),
        }
    }

    /// Number of canonical events with a live backend subscription.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

impl<W: GdWindow> fmt::Debug for Glue42Window<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glue42Window")
            .field("id", &self.inner.id())
            .field("listeners", &*self.listeners.lock())
            .finish()
    }
}

impl<W: GdWindow> ContainerWindow for Glue42Window<W> {
    type Native = W;

    fn id(&self) -> String {
        self.inner.id()
    }

    fn name(&self) -> String {
        self.inner.name()
    }

    fn url(&self) -> String {
        self.inner.url()
    }

    fn owner_id(&self) -> Option<String> {
        parent_instance_id(&self.inner)
    }

    fn native(&self) -> &W {
        &self.inner
    }

    async fn load(&self, url: &str) -> Result<()> {
        Ok(self.inner.navigate(url).await?)
    }

    async fn focus(&self) -> Result<()> {
        Ok(self.inner.focus().await?)
    }

    async fn show(&self) -> Result<()> {
        Ok(self.inner.set_visible(true).await?)
    }

    async fn hide(&self) -> Result<()> {
        Ok(self.inner.set_visible(false).await?)
    }

    async fn close(&self) -> Result<()> {
        Ok(self.inner.close().await?)
    }

    async fn minimize(&self) -> Result<()> {
        Ok(self.inner.minimize().await?)
    }

    async fn maximize(&self) -> Result<()> {
        Ok(self.inner.maximize().await?)
    }

    async fn restore(&self) -> Result<()> {
        Ok(self.inner.restore().await?)
    }

    async fn bring_to_front(&self) -> Result<()> {
        Ok(self.inner.activate().await?)
    }

    async fn is_showing(&self) -> Result<bool> {
        Ok(self.inner.is_visible())
    }

    async fn get_snapshot(&self) -> Result<String> {
        Ok(self.inner.capture().await?)
    }

    async fn get_bounds(&self) -> Result<Rectangle> {
        Ok(to_rectangle(self.inner.bounds()))
    }

    async fn set_bounds(&self, bounds: Rectangle) -> Result<()> {
        Ok(self.inner.move_resize(to_gd_bounds(bounds)).await?)
    }

    async fn flash(&self, enable: bool) -> Result<()> {
        Ok(self.inner.flash(enable).await?)
    }

    async fn get_options(&self) -> Result<Value> {
        Ok(self.inner.settings())
    }

    async fn get_state(&self) -> Result<WindowState> {
        let raw = self.inner.state();
        raw.parse::<WindowState>().map_err(|message| {
            BackendError::with_payload(
                message,
                json!({ "id": self.inner.id(), "state": raw }),
            )
            .into()
        })
    }

    async fn set_state(&self, state: WindowState) -> Result<()> {
        let current = self.get_state().await?;
        if current == state {
            return Ok(());
        }
        match state {
            WindowState::Maximized => self.inner.maximize().await?,
            WindowState::Minimized => self.inner.minimize().await?,
            WindowState::Normal if current == WindowState::Maximized => {
                self.inner.maximize_restore().await?
            }
            WindowState::Normal => self.inner.restore().await?,
        }
        Ok(())
    }

    fn allow_grouping(&self) -> bool {
        true
    }

    async fn get_group(&self) -> Result<Vec<Self>> {
        Ok(group_closure(&self.inner)
            .into_iter()
            .map(Glue42Window::new)
            .collect())
    }

    async fn join_group(&self, target: &Self) -> Result<()> {
        let target_group: HashSet<String> = group_closure(&target.inner)
            .iter()
            .map(GdWindow::id)
            .collect();
        if target_group.contains(&self.inner.id()) {
            return Ok(());
        }

        // Snapping only moves one window; bring the whole group along.
        for member in group_closure(&self.inner) {
            if !target_group.contains(&member.id()) {
                member.snap(&target.inner).await?;
            }
        }
        Ok(())
    }

    async fn leave_group(&self) -> Result<()> {
        if group_closure(&self.inner).len() <= 1 {
            return Ok(());
        }
        Ok(self.inner.ungroup().await?)
    }

    fn attach_listener(&self, event: WindowEventType, listener: EventListener) {
        let native = self.inner.clone();
        self.listeners.lock().attach(event, listener, move |listener| {
            let unsubscribe = native.on(
                native_event(event),
                Arc::new(move |window: &W| {
                    if let Some(args) = translate(event, window) {
                        dispatch(&listener, &args);
                    }
                }),
            );
            Subscription::new(unsubscribe)
        });
    }

    fn detach_listener(&self, event: WindowEventType, listener: &EventListener) {
        self.listeners.lock().detach(event, listener);
    }
}
