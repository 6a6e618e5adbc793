// Integration tests for `VpcsClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vpcs_api::{Error, Nio, TransportConfig, VmParams, VpcsClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, VpcsClient) {
    let server = MockServer::start().await;
    let url = server.uri().parse().expect("mock server URL");
    let client =
        VpcsClient::new(url, "local", &TransportConfig::default()).expect("client builds");
    (server, client)
}

fn params(value: serde_json::Value) -> VmParams {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected JSON object, got {other}"),
    }
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_vm_returns_authoritative_settings() {
    let (server, client) = setup().await;

    let request = params(json!({
        "name": "PC1",
        "project_id": "3e3c1c51-37ba-47c0-a0b4-0067d8af9f41",
    }));

    let response = json!({
        "vm_id": "f7f8f2b0",
        "name": "PC1",
        "console": 5001,
        "startup_script": null,
    });

    Mock::given(method("POST"))
        .and(path("/vpcs/vms"))
        .and(body_json(&request))
        .respond_with(ResponseTemplate::new(201).set_body_json(&response))
        .mount(&server)
        .await;

    let vm = client.create_vm(&request).await.expect("create succeeds");
    assert_eq!(vm["vm_id"], "f7f8f2b0");
    assert_eq!(vm["console"], 5001);
}

#[tokio::test]
async fn test_update_vm_sends_only_given_keys() {
    let (server, client) = setup().await;

    let diff = params(json!({ "console": 5050 }));

    Mock::given(method("PUT"))
        .and(path("/vpcs/vms/f7f8f2b0"))
        .and(body_json(&diff))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "console": 5050 })))
        .mount(&server)
        .await;

    let applied = client.update_vm("f7f8f2b0", &diff).await.expect("update succeeds");
    assert_eq!(applied["console"], 5050);
}

#[tokio::test]
async fn test_start_stop_reload_and_delete_accept_empty_bodies() {
    let (server, client) = setup().await;

    for action in ["start", "stop", "reload"] {
        Mock::given(method("POST"))
            .and(path(format!("/vpcs/vms/f7f8f2b0/{action}")))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
    }
    Mock::given(method("DELETE"))
        .and(path("/vpcs/vms/f7f8f2b0"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.start_vm("f7f8f2b0").await.expect("start");
    client.stop_vm("f7f8f2b0").await.expect("stop");
    client.reload_vm("f7f8f2b0").await.expect("reload");
    client.delete_vm("f7f8f2b0").await.expect("delete");
}

#[tokio::test]
async fn test_allocate_udp_port() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/ports/udp"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "udp_port": 10000 })))
        .mount(&server)
        .await;

    let allocation = client.allocate_udp_port().await.expect("allocation succeeds");
    assert_eq!(allocation.udp_port, 10000);
}

#[tokio::test]
async fn test_create_nio_round_trips_descriptor() {
    let (server, client) = setup().await;

    let nio = Nio::Udp {
        lport: 10000,
        rhost: "127.0.0.1".into(),
        rport: 10001,
    };

    Mock::given(method("POST"))
        .and(path("/vpcs/vms/f7f8f2b0/ports/0/nio"))
        .and(body_json(&nio))
        .respond_with(ResponseTemplate::new(201).set_body_json(&nio))
        .mount(&server)
        .await;

    let attached = client
        .create_nio("f7f8f2b0", 0, &nio)
        .await
        .expect("attach succeeds");
    assert_eq!(attached, nio);
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_server_error_envelope_is_parsed() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/vpcs/vms"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Name PC1 is already used",
            "status": 409,
        })))
        .mount(&server)
        .await;

    let err = client
        .create_vm(&VmParams::new())
        .await
        .expect_err("create must fail");

    match err {
        Error::Server { message, status } => {
            assert_eq!(message, "Name PC1 is already used");
            assert_eq!(status, 409);
        }
        other => panic!("expected Error::Server, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_error_body_falls_back_to_raw_text() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/vpcs/vms/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such VM"))
        .mount(&server)
        .await;

    let err = client.get_vm("missing").await.expect_err("get must fail");
    assert!(err.is_not_found());
    assert_eq!(err.message(), "no such VM");
}
