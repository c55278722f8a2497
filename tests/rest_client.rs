//! # REST Client Tests
//!
//! Exercises [`GrafanaRestClient`] against a mock Grafana server.

use alerting_provisioner::client::{AlertingApi, ApiError, GrafanaRestClient};
use alerting_provisioner::config::ProvisionerConfig;
use alerting_provisioner::models::{ContactPoint, MuteTiming};
use alerting_provisioner::reconciler::{ReconcileSettings, Reconciler};
use alerting_provisioner::state::{ContactPointConfig, NotifierInstance};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, auth: Option<&str>) -> GrafanaRestClient {
    let config = ProvisionerConfig {
        grafana_url: server.uri(),
        auth: auth.map(str::to_string),
        ..ProvisionerConfig::default()
    };
    GrafanaRestClient::new(&config).unwrap()
}

fn webhook_record(uid: &str, url: &str) -> serde_json::Value {
    json!({
        "uid": uid,
        "name": "ops",
        "type": "webhook",
        "settings": {"url": url},
        "disableResolveMessage": false
    })
}

#[tokio::test]
async fn test_list_sends_org_header_and_name_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/provisioning/contact-points"))
        .and(query_param("name", "ops"))
        .and(header("X-Grafana-Org-Id", "3"))
        .and(header("Authorization", "Bearer glsa_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([webhook_record("a", "https://a")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let points = client_for(&server, Some("glsa_token"))
        .list_contact_points(3, Some("ops"))
        .await
        .unwrap();

    assert_eq!(points.len(), 1);
    assert_eq!(points[0].uid, "a");
    assert_eq!(points[0].type_tag, "webhook");
    assert_eq!(points[0].settings["url"], json!("https://a"));
}

#[tokio::test]
async fn test_basic_auth_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/provisioning/contact-points"))
        .and(header("Authorization", "Basic YWRtaW46YWRtaW4="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let points = client_for(&server, Some("admin:admin"))
        .list_contact_points(1, None)
        .await
        .unwrap();
    assert!(points.is_empty());
}

#[tokio::test]
async fn test_create_posts_record_and_returns_uid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/provisioning/contact-points"))
        .and(body_partial_json(json!({
            "name": "ops",
            "type": "webhook",
            "settings": {"url": "https://a"}
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(webhook_record("new", "https://a")))
        .expect(1)
        .mount(&server)
        .await;

    let point = ContactPoint {
        name: "ops".to_string(),
        type_tag: "webhook".to_string(),
        settings: json!({"url": "https://a"}).as_object().cloned().unwrap(),
        ..ContactPoint::default()
    };
    let created = client_for(&server, None)
        .create_contact_point(1, &point)
        .await
        .unwrap();
    assert_eq!(created.uid, "new");
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/provisioning/contact-points/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/provisioning/contact-points"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "alertmanager not ready",
            "traceID": "abc"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, None);

    let err = client.delete_contact_point(1, "missing").await.unwrap_err();
    assert!(err.is_not_found(), "{err}");

    let err = client
        .create_contact_point(2, &ContactPoint::default())
        .await
        .unwrap_err();
    assert!(err.is_internal_error());
    match err {
        ApiError::Status { code, message } => {
            assert_eq!(code, 500);
            assert_eq!(message, "alertmanager not ready");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_mute_timing_paths_escape_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/provisioning/mute-timings/weekend%20nights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "weekend nights",
            "time_intervals": [{"weekdays": ["saturday", "sunday"]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let timing: MuteTiming = client_for(&server, None)
        .get_mute_timing(1, "weekend nights")
        .await
        .unwrap();
    assert_eq!(timing.name, "weekend nights");
    assert_eq!(
        timing.time_intervals[0].weekdays.as_deref(),
        Some(&["saturday".to_string(), "sunday".to_string()][..])
    );
}

#[tokio::test]
async fn test_reconciler_over_rest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/provisioning/contact-points"))
        .respond_with(ResponseTemplate::new(202).set_body_json(webhook_record("w1", "https://a")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/provisioning/contact-points"))
        .and(query_param("name", "ops"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([webhook_record("w1", "https://a")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let reconciler = Reconciler::new(
        Arc::new(client_for(&server, None)),
        ReconcileSettings::default(),
    );
    let desired = ContactPointConfig::new("ops").with_notifier(
        "webhook",
        NotifierInstance::default().with_field("url", "https://a"),
    );

    let created = reconciler.create_contact_point(&desired).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("1:ops"));
    assert_eq!(created.notifiers["webhook"][0].uid, "w1");
}
