#![allow(clippy::unwrap_used)]
// Integration tests for `NikoClient` against the loopback fake controller.

use std::time::Duration;

use serde_json::{Map, Value, json};

use nikoly_api::mock::{FakeController, Reply};
use nikoly_api::{ActionValue, Data, Error, NikoClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (FakeController, NikoClient) {
    let fake = FakeController::start().await.unwrap();
    let client = NikoClient::new(fake.endpoint());
    (fake, client)
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_system_info_returns_data_verbatim() {
    let (fake, client) = setup().await;
    fake.reply_data(
        "systeminfo",
        json!({ "swversion": "1.10.0.34209", "api": "1.19", "language": "NL" }),
    );

    let info = client.system_info().await.unwrap();

    assert_eq!(info.get("swversion"), Some(&json!("1.10.0.34209")));
    assert_eq!(info.len(), 3);
    assert_eq!(fake.requests(), vec![json!({ "cmd": "systeminfo" })]);
}

#[tokio::test]
async fn test_system_info_without_data_is_empty() {
    let (fake, client) = setup().await;
    fake.reply("systeminfo", Reply::Json(json!({ "cmd": "systeminfo" })));

    assert!(client.system_info().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_actions_maps_records() {
    let (fake, client) = setup().await;
    fake.reply_data(
        "listactions",
        json!([
            { "id": 1, "name": "Stopcontact TV", "type": 1, "location": 3, "value1": 255 },
            { "id": 2, "name": "Eettafel", "type": 2, "location": 3, "value1": 40 },
            { "id": 3, "type": 4 },
        ]),
    );

    let actions = client.list_actions().await.unwrap();

    assert_eq!(actions.len(), 3);
    assert_eq!(actions[0].name, "Stopcontact TV");
    assert_eq!(actions[1].action_type, 2);
    assert_eq!(actions[1].value1, 40);
    assert_eq!(actions[2].name, "");
    assert_eq!(actions[2].location, 0);
}

#[tokio::test]
async fn test_list_locations_keeps_reserved_location() {
    let (fake, client) = setup().await;
    fake.reply_data(
        "listlocations",
        json!([{ "id": 0, "name": "All" }, { "id": 3, "name": "Kitchen" }]),
    );

    let locations = client.list_locations().await.unwrap();

    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0].id, 0);
    assert_eq!(locations[1].name, "Kitchen");
}

#[tokio::test]
async fn test_list_with_object_payload_is_malformed() {
    let (fake, client) = setup().await;
    fake.reply_data("listactions", json!({ "unexpected": true }));

    let result = client.list_actions().await;

    assert!(
        matches!(result, Err(Error::MalformedResponse { .. })),
        "expected MalformedResponse, got: {result:?}"
    );
}

// ── Writes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_action_request_shape() {
    let (fake, client) = setup().await;
    fake.reply_data("executeactions", json!({ "error": 0 }));

    client.execute_action(17, 255).await.unwrap();

    assert_eq!(
        fake.requests(),
        vec![json!({ "cmd": "executeactions", "actions": [{ "id": 17, "value1": 255 }] })]
    );
}

#[tokio::test]
async fn test_execute_action_with_merges_extra_fields() {
    let (fake, client) = setup().await;
    fake.reply_data("executeactions", Value::Null);

    let mut extra = Map::new();
    extra.insert("source".into(), json!("cli"));
    client
        .execute_action_with(5, &json!("42"), extra)
        .await
        .unwrap();

    assert_eq!(
        fake.requests(),
        vec![json!({
            "cmd": "executeactions",
            "source": "cli",
            "actions": [{ "id": 5, "value1": 42 }],
        })]
    );
}

#[tokio::test]
async fn test_execute_action_with_rejects_non_integer_before_sending() {
    let (fake, client) = setup().await;

    let result = client
        .execute_action_with(5, &json!("bright"), Map::new())
        .await;

    assert!(matches!(result, Err(Error::InvalidRequest { .. })));
    assert!(fake.requests().is_empty());
}

#[tokio::test]
async fn test_execute_actions_batches() {
    let (fake, client) = setup().await;
    fake.reply_data("executeactions", json!({}));

    client
        .execute_actions(&[ActionValue::new(1, 0), ActionValue::new(2, 100)], Map::new())
        .await
        .unwrap();

    let request = &fake.requests()[0];
    assert_eq!(request["actions"].as_array().unwrap().len(), 2);
}

// ── Error mapping ───────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_action_protocol_error() {
    let (fake, client) = setup().await;
    fake.reply_error("executeactions", 5);

    let err = client.execute_action(1, 255).await.unwrap_err();

    match err {
        Error::Protocol {
            code,
            command,
            message,
        } => {
            assert_eq!(code, 5);
            assert_eq!(command, "executeactions");
            assert_eq!(message, "controller error 5 (cmd=executeactions)");
        }
        other => panic!("expected Protocol error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_check_applies_to_reads() {
    let (fake, client) = setup().await;
    fake.reply_error("listlocations", 3);

    let err = client.list_locations().await.unwrap_err();
    assert_eq!(err.protocol_code(), Some(3));
}

#[tokio::test]
async fn test_error_command_falls_back_to_request() {
    let (fake, client) = setup().await;
    fake.reply("systeminfo", Reply::Json(json!({ "data": { "error": 8 } })));

    let err = client.system_info().await.unwrap_err();
    assert!(
        matches!(err, Error::Protocol { ref command, .. } if command == "systeminfo"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_garbage_reply_is_malformed() {
    let (fake, client) = setup().await;
    fake.reply("systeminfo", Reply::Raw(b"<html>\r\n".to_vec()));

    let err = client.system_info().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_closed_without_reply_is_malformed() {
    let (fake, client) = setup().await;
    fake.reply("systeminfo", Reply::Close);

    let err = client.system_info().await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_silent_controller_times_out() {
    let fake = FakeController::start().await.unwrap();
    let client = NikoClient::new(fake.endpoint().with_timeout(Duration::from_millis(200)));
    fake.reply("listactions", Reply::Silent);

    let err = client.list_actions().await.unwrap_err();

    assert!(matches!(err, Error::Timeout { .. }), "got: {err:?}");
    assert!(err.is_transient());
    assert_eq!(err.to_string(), "Request timed out after 200ms");
    assert_eq!(fake.commands(), vec!["listactions"]);
}

// ── Raw commands ────────────────────────────────────────────────────

#[tokio::test]
async fn test_raw_command_round_trip() {
    let (fake, client) = setup().await;
    fake.reply_data("listenergy", json!([{ "channel": 1 }]));

    let mut fields = Map::new();
    fields.insert("channel".into(), json!(1));
    let response = client.raw_command("listenergy", fields).await.unwrap();

    assert_eq!(response.cmd, "listenergy");
    assert_eq!(response.data, Data::List(vec![json!({ "channel": 1 })]));
    assert_eq!(
        fake.requests(),
        vec![json!({ "cmd": "listenergy", "channel": 1 })]
    );
}

#[tokio::test]
async fn test_raw_command_unknown_command_errors() {
    let (_fake, client) = setup().await;

    let err = client.raw_command("nope", Map::new()).await.unwrap_err();
    assert_eq!(
        err.protocol_code(),
        Some(nikoly_api::mock::UNKNOWN_COMMAND_CODE)
    );
}
