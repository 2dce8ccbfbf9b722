#![allow(clippy::unwrap_used)]
// Integration tests for `SensorflareClient` using wiremock.

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sensorflare_api::{Error, ResourceKind, SensorflareClient, TransportConfig, USER_AGENT};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, SensorflareClient) {
    let server = MockServer::start().await;
    let client = SensorflareClient::with_base_url(&server.uri(), &TransportConfig::default())
        .unwrap();
    (server, client)
}

/// A client that already passed the auth probe. The probe mock answers
/// once, so tests can mount their own `GET /dashboard`.
async fn authenticated() -> (MockServer, SensorflareClient) {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    assert!(client.authenticate("u", &secret("p")).await.unwrap());
    (server, client)
}

fn secret(s: &str) -> SecretString {
    SecretString::from(s.to_owned())
}

async fn mount_get(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_authenticate_success_sends_basic_auth() {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .and(header("Authorization", "Basic dTpw"))
        .and(header("User-Agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.is_authenticated());
    let ok = client.authenticate("u", &secret("p")).await.unwrap();

    assert!(ok);
    assert!(client.is_authenticated());
}

#[tokio::test]
async fn test_authenticate_rejected_keeps_token() {
    let (server, mut client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let ok = client.authenticate("u", &secret("wrong")).await.unwrap();

    assert!(!ok);
    assert!(!client.is_authenticated());
    assert!(client.has_token());

    let result = client.devices().await;
    assert!(
        matches!(result, Err(Error::Unauthenticated)),
        "expected Unauthenticated, got: {result:?}"
    );
}

#[tokio::test]
async fn test_data_call_before_authenticate_sends_nothing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.dashboards().await.unwrap_err();
    assert!(err.is_unauthenticated());

    let err = client.dashboard_remove_resource(1, "gw/t").await.unwrap_err();
    assert!(err.is_unauthenticated());
}

#[tokio::test]
async fn test_base_url_with_path_prefix() {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    let mut client =
        SensorflareClient::with_base_url(&base, &TransportConfig::default()).unwrap();
    assert_eq!(client.base_url(), format!("{base}/"));

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Home"])))
        .mount(&server)
        .await;

    assert!(client.authenticate("u", &secret("p")).await.unwrap());
    assert_eq!(client.dashboards().await.unwrap(), vec!["Home".to_string()]);
}

// ── Dashboard tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboards_list() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard", r#"["Home","Office"]"#).await;

    let names = client.dashboards().await.unwrap();
    assert_eq!(names, vec!["Home".to_string(), "Office".to_string()]);
}

#[tokio::test]
async fn test_get_dashboards_by_id() {
    let (server, client) = authenticated().await;
    mount_get(
        &server,
        "/dashboards",
        r#"{"dashboards":[{"id":1,"name":"Home"},{"id":2,"name":"Lab"},{"id":1,"name":"Cabin"}]}"#,
    )
    .await;

    let dashboards = client.get_dashboards().await.unwrap();
    assert_eq!(
        dashboards,
        BTreeMap::from([(1, "Cabin".to_string()), (2, "Lab".to_string())])
    );
}

#[tokio::test]
async fn test_get_dashboards_single() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboards", r#"{"dashboards":[{"id":1,"name":"Home"}]}"#).await;

    let dashboards = client.get_dashboards().await.unwrap();
    assert_eq!(dashboards.into_iter().collect::<Vec<_>>(), vec![(1, "Home".to_string())]);
}

#[tokio::test]
async fn test_get_dashboard_resources() {
    let (server, client) = authenticated().await;
    mount_get(
        &server,
        "/dashboards/7/resources",
        r#"{"resources":[{"id":10,"uri":"gw1/temp"},{"id":11,"uri":"gw1/relay"}]}"#,
    )
    .await;

    let resources = client.get_dashboard_resources(7).await.unwrap();
    assert_eq!(
        resources,
        BTreeMap::from([(10, "gw1/temp".to_string()), (11, "gw1/relay".to_string())])
    );
}

#[tokio::test]
async fn test_refresh_hash_is_raw_body() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/7/resources/description/hash", "a1b2c3").await;

    assert_eq!(client.get_dashboard_refresh_hash(7).await.unwrap(), "a1b2c3");
}

#[tokio::test]
async fn test_create_dashboard_and_fetch() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/create/Garage", r#"{"id":9,"name":"Garage"}"#).await;
    mount_get(&server, "/dashboard/9", r#"{"id":9,"name":"Garage","resources":[]}"#).await;

    let created = client.create_dashboard("Garage").await.unwrap();
    assert_eq!(created, json!({"id": 9, "name": "Garage"}));

    let dashboard = client.dashboard(9).await.unwrap();
    assert_eq!(dashboard["resources"], json!([]));
}

#[tokio::test]
async fn test_dashboard_set_location_posts_form() {
    let (server, client) = authenticated().await;

    Mock::given(method("POST"))
        .and(path("/dashboard/4/location/"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string("longitude=21.5&latitude=38.25"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 4, "longitude": 21.5, "latitude": 38.25})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reply = client.dashboard_set_location(4, 21.5, 38.25).await.unwrap();
    assert_eq!(reply["latitude"], json!(38.25));
}

#[tokio::test]
async fn test_dashboard_add_resource_reserializes() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/3/add/resource/gw1/temp", r#"{ "id" : 3 }"#).await;

    let reply = client.dashboard_add_resource(3, "gw1/temp").await.unwrap();
    assert_eq!(reply, r#"{"id":3}"#);
}

#[tokio::test]
async fn test_dashboard_remove_resource_exact_ok() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/3/disconnect/gw1/temp", r#"{"status":"Ok","code":200}"#).await;
    mount_get(
        &server,
        "/dashboard/3/disconnect/gw1/relay",
        r#"{"status":"Ok","code":200,"extra":1}"#,
    )
    .await;

    assert!(client.dashboard_remove_resource(3, "gw1/temp").await.unwrap());
    assert!(!client.dashboard_remove_resource(3, "gw1/relay").await.unwrap());
}

#[tokio::test]
async fn test_dashboard_set_featured_resource() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/3/featured/gw1/temp", r#"{"code":200,"status":"Ok"}"#).await;

    assert!(client.dashboard_set_featured_resource(3, "gw1/temp").await.unwrap());
}

#[tokio::test]
async fn test_dashboard_delete_checks_code() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/delete/1", r#"{"status":"Ok","code":200,"id":1}"#).await;
    mount_get(&server, "/dashboard/delete/2", r#"{"status":"Error","code":404}"#).await;
    mount_get(&server, "/dashboard/delete/3", r#"{"status":"Ok"}"#).await;

    assert!(client.dashboard_delete(1).await.unwrap());
    assert!(!client.dashboard_delete(2).await.unwrap());

    let result = client.dashboard_delete(3).await;
    assert!(
        matches!(result, Err(Error::UnexpectedShape { .. })),
        "expected UnexpectedShape, got: {result:?}"
    );
}

#[tokio::test]
async fn test_dashboard_resources_by_name() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/dashboard/Home/resource", r#"["gw1/temp","gw1/relay"]"#).await;

    let resources = client.dashboard_resources("Home").await.unwrap();
    assert_eq!(resources, vec!["gw1/temp".to_string(), "gw1/relay".to_string()]);
}

// ── Resource tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_resource_details_sensor_without_name() {
    let (server, client) = authenticated().await;
    mount_get(
        &server,
        "/resource/gw1/temp/description",
        r#"{"isa":"sensor","observes":"temperature"}"#,
    )
    .await;

    let details = client.get_resource_details("gw1/temp").await.unwrap().unwrap();
    assert_eq!(details.name, "temperature");
    assert_eq!(details.isa, "sensor");
    assert_eq!(details.observes, "temperature");
    assert_eq!(details.controls, "");
    assert_eq!(details.kind(), ResourceKind::Sensor);
}

#[tokio::test]
async fn test_resource_details_without_isa_is_none() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/resource/gw1/temp/description", r#"{"name":"Kitchen"}"#).await;

    assert!(client.get_resource_details("gw1/temp").await.unwrap().is_none());
}

#[tokio::test]
async fn test_resource_details_escapes_spaces_and_names_from_uri() {
    let (server, client) = authenticated().await;
    mount_get(
        &server,
        "/resource/gw1/power%20meter/description",
        r#"{"isa":"meter"}"#,
    )
    .await;

    let details = client
        .get_resource_details("gw1/power meter")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(details.name, "power meter");
    assert_eq!(details.kind(), ResourceKind::Other);
}

#[tokio::test]
async fn test_resources_fragment_parsing() {
    let (server, client) = authenticated().await;
    mount_get(
        &server,
        "/resource",
        r#"["{\"a\":\"1\"}","{\"temperature\":\"gw1/temp\"}","garbage"]"#,
    )
    .await;

    let resources = client.resources().await.unwrap();
    assert_eq!(resources.len(), 2);
    assert_eq!(resources["a"], "1");
    assert_eq!(resources["temperature"], "gw1/temp");
}

#[tokio::test]
async fn test_resource_description_is_raw_body() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/resource/gw1/temp/description", r#"{"isa":"sensor"}"#).await;

    assert_eq!(
        client.resource_description("gw1/temp").await.unwrap(),
        r#"{"isa":"sensor"}"#
    );
}

#[tokio::test]
async fn test_resource_property_actions() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/resource/5/property/2", r#"{"status":"Ok","code":200}"#).await;
    mount_get(&server, "/resource/5/property", r#"{"status":"Error","code":500}"#).await;

    assert!(client.resource_remove_property(5, 2).await.unwrap());
    assert!(!client.resource_clear_property(5).await.unwrap());
}

#[tokio::test]
async fn test_set_resource_value() {
    let (server, client) = authenticated().await;

    Mock::given(method("POST"))
        .and(path("/report/set/21.0/gw1/relay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "OK"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/report/set/0.5/gw1/relay"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "failed"})))
        .mount(&server)
        .await;

    assert!(client.set_resource_value("gw1/relay", 21.0).await.unwrap());
    assert!(!client.set_resource_value("gw1/relay", 0.5).await.unwrap());
}

// ── Device, gateway and schedule tests ──────────────────────────────

#[tokio::test]
async fn test_devices_and_schedules() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/device", r#"["plug-1","plug-2"]"#).await;
    mount_get(&server, "/schedule", r#"["morning"]"#).await;

    assert_eq!(client.devices().await.unwrap().len(), 2);
    assert_eq!(client.schedules().await.unwrap(), vec!["morning".to_string()]);
}

#[tokio::test]
async fn test_gateways() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/gateway", r#"[{"id":1,"name":"gw1"},{"id":2,"name":"gw2"}]"#).await;
    mount_get(&server, "/gateway/gw1", r#"{"name":"gw1","properties":{"floor":"2"}}"#).await;
    mount_get(&server, "/gateway/floor/2", r#"{"status":"Ok","code":200}"#).await;

    let gateways = client.gateways().await.unwrap();
    assert_eq!(
        gateways,
        BTreeMap::from([(1, "gw1".to_string()), (2, "gw2".to_string())])
    );

    let info = client.gateway_view_info("gw1").await.unwrap();
    assert_eq!(info["properties"]["floor"], "2");

    assert!(client.gateway_add_property("floor", "2").await.unwrap());
}

#[tokio::test]
async fn test_schedule_create_and_delete() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/schedule/lights/0-8/on/60/off", r#"{"id": 12}"#).await;
    mount_get(&server, "/schedule/12", r#"{"status":"Ok","code":200}"#).await;

    let created = client
        .schedule_create("lights", "0-8", "on", 60, "off")
        .await
        .unwrap();
    assert_eq!(created, r#"{"id":12}"#);
    assert!(client.schedule_delete(12).await.unwrap());
}

#[tokio::test]
async fn test_summary_variants_match() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/report/latest/gw1/temp", r#"{"value":21.5}"#).await;

    let a = client.summary("gw1/temp").await.unwrap();
    let b = client.string_summary("gw1/temp").await.unwrap();
    assert_eq!(a, r#"{"value":21.5}"#);
    assert_eq!(a, b);
}

// ── Error path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_http_error_status() {
    let (server, client) = authenticated().await;

    Mock::given(method("GET"))
        .and(path("/dashboard/99"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such dashboard"))
        .mount(&server)
        .await;

    let err = client.dashboard(99).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert_eq!(err.body(), Some("no such dashboard"));
}

#[tokio::test]
async fn test_malformed_json_is_deserialization_error() {
    let (server, client) = authenticated().await;
    mount_get(&server, "/device", "not json").await;

    let result = client.devices().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[test]
fn test_invalid_base_urls() {
    for bad in ["", "www.sensorflare.com/api", "ftp://sensorflare.com/api"] {
        let result = SensorflareClient::with_base_url(bad, &TransportConfig::default());
        assert!(
            matches!(result, Err(Error::InvalidBaseUrl { .. })),
            "{bad:?} should be rejected"
        );
    }
}
