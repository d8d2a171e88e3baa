//! Container lifecycle: connect, notification replacement and shutdown.

mod common;

use std::sync::{Arc, Mutex};

use common::{TestContext, settle};
use deskweave::{ContainerEvent, ContainerState, ContainerWindow, NotificationOptions};
use deskweave_core::NotificationEnvironment;
use deskweave_glue42::mock::MockDesktop;

fn record_events(ctx: &TestContext) -> Arc<Mutex<Vec<ContainerEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    ctx.container
        .add_event_listener(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

#[tokio::test]
async fn test_operations_fail_before_connect() {
    let ctx = TestContext::new();
    assert_eq!(ctx.container.state(), ContainerState::Uninitialized);

    let err = ctx.container.get_current_window().await.unwrap_err();
    assert!(err.is_not_ready());
    assert!(err.to_string().contains("Uninitialized"));
    assert!(ctx.container.get_all_windows().await.unwrap_err().is_not_ready());
}

#[tokio::test]
async fn test_connect_reaches_ready() {
    let ctx = TestContext::new();
    let events = record_events(&ctx);

    ctx.container.connect().await.unwrap();
    assert!(ctx.container.is_ready());
    assert_eq!(ctx.container.host_type(), "Glue42");
    assert_eq!(ctx.container.get_current_window().await.unwrap().id(), "main");

    // Connecting again is a no-op.
    ctx.container.connect().await.unwrap();

    let events = events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            ContainerEvent::StateChanged {
                from: ContainerState::Uninitialized,
                to: ContainerState::Connecting,
            },
            ContainerEvent::StateChanged {
                from: ContainerState::Connecting,
                to: ContainerState::Ready,
            },
        ]
    );
}

#[tokio::test]
async fn test_failed_connect_can_be_retried() {
    let desktop = MockDesktop::new();
    desktop.fail_init("runtime not found");
    let ctx = TestContext::with_desktop(desktop);

    let err = ctx.container.connect().await.unwrap_err();
    assert!(err.to_string().contains("runtime not found"));
    assert_eq!(ctx.container.state(), ContainerState::Uninitialized);
    assert!(!ctx.hub.is_installed());

    ctx.container.connect().await.unwrap();
    assert!(ctx.container.is_ready());
}

#[tokio::test]
async fn test_notification_entry_point_replaced_while_connected() {
    let ctx = TestContext::new();
    assert!(!ctx.hub.is_installed());

    ctx.container.connect().await.unwrap();
    assert!(ctx.hub.is_installed());

    assert!(ctx.hub.notify("Build", &NotificationOptions::with_body("done")));
    settle().await;
    let invocations = ctx.desktop.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(invocations[0].0, "T42.GNS.Publish.RaiseNotification");
    assert_eq!(invocations[0].1["notification"]["description"], "done");

    ctx.container.close().await.unwrap();
    assert!(!ctx.hub.is_installed());
}

#[tokio::test]
async fn test_previous_notification_handler_is_restored() {
    let ctx = TestContext::new();
    let previous_calls = Arc::new(Mutex::new(0));
    let counter = Arc::clone(&previous_calls);
    ctx.hub
        .replace_notification(Some(Arc::new(move |_: &str, _: &NotificationOptions| {
            *counter.lock().unwrap() += 1;
        })));

    ctx.container.connect().await.unwrap();
    ctx.hub.notify("while connected", &NotificationOptions::default());
    assert_eq!(*previous_calls.lock().unwrap(), 0);

    ctx.container.close().await.unwrap();
    ctx.hub.notify("after close", &NotificationOptions::default());
    assert_eq!(*previous_calls.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_notification_replacement_can_be_disabled() {
    let desktop = MockDesktop::new();
    let hub = Arc::new(deskweave::NotificationHub::new());
    let options = deskweave::ContainerOptions::default().with_replace_notification_api(false);
    let container = deskweave::Container::with_environment(
        deskweave::Glue42Container::new(desktop, Default::default()),
        options,
        hub.clone(),
    );

    container.connect().await.unwrap();
    assert!(!hub.is_installed());
}

#[tokio::test]
async fn test_close_closes_children_before_owners() {
    let desktop = MockDesktop::new();
    desktop.add_window("a", Some("main"));
    desktop.add_window("b", Some("a"));
    desktop.add_window("c", Some("main"));
    let ctx = TestContext::with_desktop(desktop);
    ctx.container.connect().await.unwrap();

    let report = ctx.container.close().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.closed, vec!["c", "b", "a", "main"]);
    assert!(ctx.desktop.window_ids().is_empty());
    assert_eq!(ctx.container.state(), ContainerState::Closed);

    let err = ctx.container.get_main_window().await.unwrap_err();
    assert!(err.is_not_ready());
    assert!(err.to_string().contains("Closed"));
}

#[tokio::test]
async fn test_close_reports_failures_and_finishes() {
    let desktop = MockDesktop::new();
    desktop.add_window("a", Some("main"));
    desktop.add_window("b", Some("main"));
    desktop.fail_close("a");
    let ctx = TestContext::with_desktop(desktop);
    ctx.container.connect().await.unwrap();

    let report = ctx.container.close().await.unwrap();
    assert!(!report.is_clean());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "a");
    assert_eq!(report.closed, vec!["b", "main"]);
    assert_eq!(ctx.container.state(), ContainerState::Closed);
    assert!(!ctx.hub.is_installed());
}

#[tokio::test]
async fn test_close_without_connect_and_twice() {
    let ctx = TestContext::new();
    let report = ctx.container.close().await.unwrap();
    assert!(report.closed.is_empty());
    assert_eq!(ctx.container.state(), ContainerState::Closed);

    let report = ctx.container.close().await.unwrap();
    assert!(report.closed.is_empty());
    assert!(ctx.container.connect().await.unwrap_err().is_not_ready());
    assert_eq!(ctx.desktop.window_ids(), vec!["main"]);
}

#[tokio::test]
async fn test_main_window_close_shuts_container_down() {
    let desktop = MockDesktop::new();
    desktop.add_window("a", Some("main"));
    desktop.add_window("b", Some("a"));
    let ctx = TestContext::with_desktop(desktop);
    let events = record_events(&ctx);
    ctx.container.connect().await.unwrap();

    let main = ctx.container.get_main_window().await.unwrap();
    main.close().await.unwrap();
    settle().await;

    assert_eq!(ctx.container.state(), ContainerState::Closed);
    assert!(ctx.desktop.window_ids().is_empty());
    assert!(!ctx.hub.is_installed());
    assert!(events.lock().unwrap().contains(&ContainerEvent::StateChanged {
        from: ContainerState::Closing,
        to: ContainerState::Closed,
    }));
}

#[tokio::test]
async fn test_dropping_container_restores_notification_entry_point() {
    let ctx = TestContext::connected().await;
    assert!(ctx.hub.is_installed());

    let TestContext { hub, container, .. } = ctx;
    drop(container);
    assert!(!hub.is_installed());
}
