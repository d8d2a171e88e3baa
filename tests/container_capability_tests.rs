//! Message bus, displays, global shortcuts, notifications and logging through
//! the container.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::TestContext;
use deskweave::{
    Glue42Features, MessageBusOptions, MessageBusSubscription, NotificationOptions, Point,
    Rectangle,
};
use deskweave_core::{BusEvent, BusListener, TrayIconDetails};
use serde_json::{Value, json};

fn recorder() -> (BusListener, Arc<Mutex<Vec<(String, Value)>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let listener: BusListener = Arc::new(move |event: &BusEvent, message: &Value| {
        sink.lock().unwrap().push((event.topic.clone(), message.clone()));
    });
    (listener, seen)
}

#[tokio::test]
async fn test_bus_round_trip_and_unsubscribe() {
    let ctx = TestContext::connected().await;
    let (listener, seen) = recorder();

    let subscription = ctx.container.subscribe("prices", listener, None).await.unwrap();
    assert_eq!(subscription.topic, "prices");

    ctx.container
        .publish("prices", json!({"px": 101}), None)
        .await
        .unwrap();
    ctx.container.unsubscribe(&subscription).await.unwrap();
    ctx.container.publish("prices", json!({"px": 102}), None).await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![("prices".to_string(), json!({"px": 101}))]
    );

    let err = ctx.container.unsubscribe(&subscription).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bus_drops_late_deliveries() {
    let ctx = TestContext::connected().await;
    let (listener, seen) = recorder();
    let subscription = ctx.container.subscribe("orders", listener, None).await.unwrap();
    ctx.container.unsubscribe(&subscription).await.unwrap();

    ctx.desktop.deliver_late("orders", json!("late"));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_bus_unknown_token_is_not_found() {
    let ctx = TestContext::connected().await;
    let stranger = MessageBusSubscription::new("prices", None);
    assert!(ctx.container.unsubscribe(&stranger).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_bus_target_is_forwarded() {
    let ctx = TestContext::connected().await;
    ctx.container
        .publish("t", json!(1), Some(MessageBusOptions::targeted("app-2")))
        .await
        .unwrap();
    let published = ctx.desktop.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].2.as_deref(), Some("app-2"));
}

#[tokio::test]
async fn test_disabled_bus_is_unsupported() {
    let ctx = TestContext::with_features(Glue42Features {
        bus: false,
        hotkeys: false,
        ..Default::default()
    });
    ctx.container.connect().await.unwrap();

    let (listener, _) = recorder();
    let err = ctx.container.subscribe("x", listener, None).await.unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("messageBus"));

    let err = ctx
        .container
        .register_shortcut("Ctrl+K", Arc::new(|| {}))
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[tokio::test]
async fn test_displays_and_mouse_position() {
    let ctx = TestContext::new();
    ctx.desktop.add_display(json!({
        "id": 2,
        "scaleFactor": 2.0,
        "bounds": {"left": 1920, "top": 0, "width": 2560, "height": 1440},
        "workingArea": {"left": 1920, "top": 0, "width": 2560, "height": 1400},
    }));
    ctx.desktop.set_mouse_position(json!({"x": 50, "y": 60}));
    ctx.container.connect().await.unwrap();

    let primary = ctx.container.get_primary_display().await.unwrap();
    assert_eq!(primary.id, "primary");
    assert_eq!(primary.work_area, Rectangle::new(0, 0, 1920, 1040));

    let displays = ctx.container.get_all_displays().await.unwrap();
    assert_eq!(displays.len(), 2);
    assert_eq!(displays[1].id, "2");
    assert_eq!(displays[1].scale_factor, 2.0);
    assert_eq!(displays[1].bounds, Rectangle::new(1920, 0, 2560, 1440));

    assert_eq!(
        ctx.container.get_mouse_position().await.unwrap(),
        Point { x: 50, y: 60 }
    );
}

#[tokio::test]
async fn test_global_shortcuts() {
    let ctx = TestContext::connected().await;
    let presses = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&presses);

    ctx.container
        .register_shortcut(
            "CommandOrControl+Shift+L",
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .await
        .unwrap();
    ctx.container
        .register_shortcut("Alt+1", Arc::new(|| {}))
        .await
        .unwrap();
    assert!(
        ctx.container
            .is_shortcut_registered("CommandOrControl+Shift+L")
            .await
            .unwrap()
    );

    assert!(ctx.desktop.press_hotkey("CommandOrControl+Shift+L"));
    assert_eq!(presses.load(Ordering::SeqCst), 1);

    ctx.container
        .unregister_shortcut("CommandOrControl+Shift+L")
        .await
        .unwrap();
    assert!(
        !ctx.container
            .is_shortcut_registered("CommandOrControl+Shift+L")
            .await
            .unwrap()
    );
    assert!(ctx.container.is_shortcut_registered("Alt+1").await.unwrap());

    ctx.container.unregister_all_shortcuts().await.unwrap();
    assert!(!ctx.container.is_shortcut_registered("Alt+1").await.unwrap());
}

#[tokio::test]
async fn test_show_notification_raises_through_runtime() {
    let ctx = TestContext::connected().await;
    ctx.container
        .show_notification("Trade booked", &NotificationOptions::with_body("10 @ 101"))
        .await
        .unwrap();

    let invocations = ctx.desktop.invocations();
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        invocations[0].1,
        json!({"notification": {
            "title": "Trade booked",
            "severity": "High",
            "description": "10 @ 101",
        }})
    );
}

#[tokio::test]
async fn test_tray_icon_is_unsupported() {
    let ctx = TestContext::connected().await;
    let details = TrayIconDetails {
        icon: "icon.png".to_string(),
        text: None,
    };
    let err = ctx
        .container
        .add_tray_icon(&details, Arc::new(|| {}), &[])
        .await
        .unwrap_err();
    assert!(err.is_unsupported());
    assert!(err.to_string().contains("Glue42"));
}

#[tokio::test]
async fn test_log_forwards_to_runtime_logger() {
    let ctx = TestContext::connected().await;
    ctx.container
        .log(log::Level::Warn, "disk almost full")
        .await
        .unwrap();
    assert_eq!(
        ctx.desktop.logs(),
        vec![("warn".to_string(), "disk almost full".to_string())]
    );
}

#[tokio::test]
async fn test_capabilities_require_ready() {
    let ctx = TestContext::new();
    assert!(ctx.container.get_all_displays().await.unwrap_err().is_not_ready());
    assert!(
        ctx.container
            .publish("t", json!(null), None)
            .await
            .unwrap_err()
            .is_not_ready()
    );
    assert!(
        ctx.container
            .is_shortcut_registered("Alt+1")
            .await
            .unwrap_err()
            .is_not_ready()
    );
}
