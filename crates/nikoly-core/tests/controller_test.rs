#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against the loopback fake controller.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::{Map, json};

use nikoly_api::mock::{FakeController, Reply};
use nikoly_core::{Controller, ControllerConfig, CoreError, DeviceKind, Setting};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(fake: &FakeController) -> ControllerConfig {
    let endpoint = fake.endpoint();
    ControllerConfig {
        address: endpoint.address,
        port: endpoint.port,
        timeout: endpoint.timeout,
        ..ControllerConfig::default()
    }
}

fn stage_house(fake: &FakeController) {
    fake.reply_data("systeminfo", json!({ "swversion": "1.10.0", "api": "1.19" }));
    fake.reply_data(
        "listactions",
        json!([
            { "id": 1, "name": "Plafond", "type": 1, "location": 3, "value1": 0 },
            { "id": 2, "name": "Stopcontact TV", "type": 1, "location": 3, "value1": 255 },
            { "id": 3, "name": "Eettafel", "type": 2, "location": 5, "value1": 42 },
        ]),
    );
    fake.reply_data(
        "listlocations",
        json!([
            { "id": 0, "name": "" },
            { "id": 3, "name": "Woonkamer" },
            { "id": 5, "name": "Keuken" },
        ]),
    );
}

async fn setup() -> (FakeController, Controller) {
    let fake = FakeController::start().await.unwrap();
    stage_house(&fake);
    let controller = Controller::new(config_for(&fake));
    (fake, controller)
}

// ── Refresh ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_refresh_populates_cache_in_order() {
    let (fake, controller) = setup().await;
    assert!(controller.last_refresh().is_none());

    controller.refresh().await.unwrap();

    assert_eq!(
        fake.commands(),
        vec!["systeminfo", "listactions", "listlocations"]
    );
    assert_eq!(controller.devices().len(), 3);
    assert_eq!(controller.all_locations().len(), 3);
    assert_eq!(controller.system_info().get("api"), Some(&json!("1.19")));
    assert!(controller.last_refresh().is_some());
}

#[tokio::test]
async fn test_locations_exclude_reserved_id() {
    let (_fake, controller) = setup().await;
    controller.refresh().await.unwrap();

    let ids: Vec<i64> = controller.locations().iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![3, 5]);
    assert!(controller.all_locations().iter().any(|l| l.id == 0));
}

#[tokio::test]
async fn test_devices_in_location() {
    let (_fake, controller) = setup().await;
    controller.refresh().await.unwrap();

    let names: Vec<String> = controller
        .devices_in(3)
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Plafond", "Stopcontact TV"]);
    assert!(controller.devices_in(99).is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let (fake, controller) = setup().await;
    controller.refresh().await.unwrap();
    let before = controller.snapshot();

    fake.reply_data("listactions", json!([{ "id": 9, "name": "Nieuw", "type": 1 }]));
    fake.reply("listlocations", Reply::Raw(b"not json\r\n".to_vec()));

    let err = controller.refresh().await.unwrap_err();

    assert!(matches!(err, CoreError::MalformedResponse { .. }), "got: {err:?}");
    assert_eq!(controller.snapshot(), before);
    assert!(controller.device(9).is_err());
}

#[tokio::test]
async fn test_failed_list_actions_keeps_previous_snapshot() {
    let (fake, controller) = setup().await;
    controller.refresh().await.unwrap();
    let devices = controller.devices();
    let locations = controller.all_locations();

    fake.reply_error("listactions", 12);

    let err = controller.refresh().await.unwrap_err();

    assert_eq!(err.controller_code(), Some(12));
    assert_eq!(controller.devices(), devices);
    assert_eq!(controller.all_locations(), locations);
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_protocol_error_leaves_cache() {
    let (fake, controller) = setup().await;
    controller.refresh().await.unwrap();
    let devices = controller.devices();
    fake.reply_error("executeactions", 5);

    let device = controller.device(1).unwrap();
    let err = controller.execute(&device, 255).await.unwrap_err();

    match err {
        CoreError::Controller { code, command, .. } => {
            assert_eq!(code, 5);
            assert_eq!(command, "executeactions");
        }
        other => panic!("expected Controller error, got: {other:?}"),
    }
    assert_eq!(controller.devices(), devices);
}

#[tokio::test]
async fn test_execute_does_not_refresh() {
    let (fake, controller) = setup().await;
    controller.refresh().await.unwrap();
    fake.reply_data("executeactions", json!({ "error": 0 }));

    let device = controller.device(1).unwrap();
    controller.execute(&device, 255).await.unwrap();

    assert_eq!(fake.commands().last().unwrap(), "executeactions");
    assert_eq!(controller.device(1).unwrap().value, 0);
}

#[tokio::test]
async fn test_apply_maps_settings_per_kind() {
    let (fake, controller) = setup().await;
    controller.refresh().await.unwrap();
    fake.reply_data("executeactions", json!({}));

    let classifier = controller.classifier().await;
    let socket = controller.device(2).unwrap();
    let dimmer = controller.device(3).unwrap();
    assert_eq!(classifier.classify(&socket), DeviceKind::Socket);
    assert_eq!(classifier.classify(&dimmer), DeviceKind::Dimmer);

    assert_eq!(controller.apply(&socket, Setting::On).await.unwrap(), 255);
    assert_eq!(controller.apply(&dimmer, Setting::On).await.unwrap(), 100);
    assert_eq!(
        controller
            .apply(&dimmer, Setting::Brightness(140))
            .await
            .unwrap(),
        100
    );

    let sent: Vec<i64> = fake
        .requests()
        .iter()
        .filter(|r| r["cmd"] == "executeactions")
        .map(|r| r["actions"][0]["value1"].as_i64().unwrap())
        .collect();
    assert_eq!(sent, vec![255, 100, 100]);
}

#[tokio::test]
async fn test_apply_brightness_to_switch_is_rejected_locally() {
    let (fake, controller) = setup().await;
    controller.refresh().await.unwrap();

    let switch = controller.device(1).unwrap();
    let err = controller
        .apply(&switch, Setting::Brightness(50))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidSetting { .. }));
    assert!(!fake.commands().contains(&"executeactions".to_owned()));
}

#[tokio::test]
async fn test_unknown_device_is_not_found() {
    let (_fake, controller) = setup().await;
    controller.refresh().await.unwrap();

    assert!(matches!(
        controller.device(404),
        Err(CoreError::DeviceNotFound { id: 404 })
    ));
}

#[tokio::test]
async fn test_location_lookup_includes_reserved() {
    let (_fake, controller) = setup().await;
    controller.refresh().await.unwrap();

    assert_eq!(controller.location(5).unwrap().name, "Keuken");
    assert_eq!(controller.location(0).unwrap().id, 0);
    assert!(matches!(
        controller.location(8),
        Err(CoreError::LocationNotFound { id: 8 })
    ));
}

// ── Session management ──────────────────────────────────────────────

#[tokio::test]
async fn test_update_endpoint_switches_controller() {
    let (first, controller) = setup().await;
    controller.refresh().await.unwrap();

    let second = FakeController::start().await.unwrap();
    stage_house(&second);
    second.reply_data("listactions", json!([]));

    controller.update_endpoint(config_for(&second)).await;
    assert_eq!(controller.devices().len(), 3);

    controller.refresh().await.unwrap();

    assert_eq!(first.commands().len(), 3);
    assert_eq!(second.commands().len(), 3);
    assert!(controller.devices().is_empty());
    assert_eq!(controller.config().await.port, second.port());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_endpoint_swap_waits_for_refresh_to_commit() {
    let (first, controller) = setup().await;
    first.reply(
        "listlocations",
        Reply::Delayed(
            Duration::from_millis(300),
            json!({ "cmd": "listlocations", "data": [{ "id": 3, "name": "Woonkamer" }] }),
        ),
    );
    let second = FakeController::start().await.unwrap();
    stage_house(&second);

    let refreshing = tokio::spawn({
        let controller = controller.clone();
        async move { controller.refresh().await }
    });
    while !first.commands().iter().any(|c| c == "listlocations") {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    controller.update_endpoint(config_for(&second)).await;

    // The refresh held the session, so its snapshot is already in place.
    assert!(controller.last_refresh().is_some());
    assert_eq!(controller.devices().len(), 3);
    assert_eq!(controller.all_locations().len(), 1);
    refreshing.await.unwrap().unwrap();
    assert!(second.commands().is_empty());
}

#[tokio::test]
async fn test_unreachable_controller_is_connection_failure() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let controller = Controller::new(ControllerConfig {
        address: "127.0.0.1".into(),
        port,
        timeout: std::time::Duration::from_secs(1),
        ..ControllerConfig::default()
    });
    let err = controller.refresh().await.unwrap_err();

    assert!(
        matches!(err, CoreError::ConnectionFailed { .. } | CoreError::Timeout { .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_raw_command_passthrough() {
    let (fake, controller) = setup().await;
    fake.reply_data("listenergy", json!([]));

    let response = controller
        .raw_command("listenergy", Map::new())
        .await
        .unwrap();

    assert_eq!(response.cmd, "listenergy");
    assert!(controller.last_refresh().is_none());
}

#[tokio::test]
async fn test_oneshot_refreshes_first() {
    let fake = FakeController::start().await.unwrap();
    stage_house(&fake);

    let count = Controller::oneshot(config_for(&fake), |controller| async move {
        Ok(controller.locations().len())
    })
    .await
    .unwrap();

    assert_eq!(count, 2);
}
