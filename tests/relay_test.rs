//! End-to-end relay tests against mocked incident.io and Jira APIs

use axum::body::Body;
use axum::http::{Request, StatusCode};
use incident_jira_relay::config::{FieldMapping, FieldMappings, IncidentIoConfig, JiraConfig, RelayConfig};
use incident_jira_relay::server::RelayServer;
use incident_jira_relay::sync::ComponentSync;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{basic_auth, bearer_token, body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMPACTED_FIELD: &str = "customfield_10100";
const RESPONSIBLE_FIELD: &str = "customfield_10200";

fn relay_config(incident_io: &MockServer, jira: &MockServer) -> RelayConfig {
    RelayConfig {
        incident_io: IncidentIoConfig {
            base_url: incident_io.uri(),
            api_token: "inc-token".to_string(),
        },
        jira: JiraConfig {
            base_url: jira.uri(),
            username: "relay@example.com".to_string(),
            api_token: "jira-token".to_string(),
            workspace_id: "ws-42".to_string(),
        },
        field_mappings: FieldMappings {
            impacted_components: FieldMapping::new("Impacted component", IMPACTED_FIELD),
            responsible_components: FieldMapping::new("Responsible components", RESPONSIBLE_FIELD),
        },
        ..RelayConfig::default()
    }
}

fn catalog_entry(id: &str, object_key: &str) -> Value {
    json!({
        "catalog_entry": {
            "id": id,
            "name": format!("Component {}", id),
            "attribute_values": {
                "01HATTR": { "value": { "literal": object_key } },
                "01HOTHER": { "value": { "literal": "ignored" } }
            }
        },
        "catalog_type": {
            "schema": {
                "attributes": [
                    { "id": "01HOTHER", "name": "Owner" },
                    { "id": "01HATTR", "name": "Object Key" }
                ]
            }
        }
    })
}

async fn mount_catalog_entry(server: &MockServer, id: &str, object_key: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v2/catalog_entries/{}", id)))
        .and(bearer_token("inc-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_entry(id, object_key)))
        .mount(server)
        .await;
}

fn webhook_body(event_type: &str, issue_key: &str, fields: Value) -> String {
    let incident = json!({
        "id": "01HINC",
        "name": "Checkout errors",
        "external_issue_reference": {
            "provider": "jira",
            "issue_name": issue_key,
            "issue_permalink": format!("https://example.atlassian.net/browse/{}", issue_key)
        },
        "custom_field_entries": fields
    });

    let payload = if event_type == "public_incident.incident_updated_v2" {
        json!({
            "event_type": event_type,
            "public_incident.incident_updated_v2": incident
        })
    } else {
        json!({ "event_type": event_type, "incident": incident })
    };
    payload.to_string()
}

fn field_entry(name: &str, catalog_ids: &[&str]) -> Value {
    let values: Vec<Value> = catalog_ids
        .iter()
        .map(|id| json!({ "value_catalog_entry": { "id": id, "name": "", "external_id": "" } }))
        .collect();
    json!({
        "custom_field": { "id": format!("cf-{}", name), "name": name, "description": "", "field_type": "multi_select" },
        "values": values
    })
}

async fn post_webhook(config: &RelayConfig, body: String) -> StatusCode {
    let syncer = ComponentSync::from_config(config).unwrap();
    let app = RelayServer::new(syncer).into_router();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_field_update_reaches_jira() {
    let incident_io = MockServer::start().await;
    let jira = MockServer::start().await;

    mount_catalog_entry(&incident_io, "cat-a", "PIN-3").await;
    mount_catalog_entry(&incident_io, "cat-b", "SUP-2024-10").await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/PIN-7"))
        .and(basic_auth("relay@example.com", "jira-token"))
        .and(body_json(json!({
            "fields": {
                IMPACTED_FIELD: [
                    { "id": "ws-42:3", "objectId": "3" },
                    { "id": "ws-42:10", "objectId": "10" }
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&jira)
        .await;

    let config = relay_config(&incident_io, &jira);
    let body = webhook_body(
        "incident.custom_field_updated",
        "PIN-7",
        json!([field_entry("Impacted component", &["cat-a", "cat-b"])]),
    );

    assert_eq!(post_webhook(&config, body).await, StatusCode::OK);
}

#[tokio::test]
async fn test_v2_event_updates_both_fields() {
    let incident_io = MockServer::start().await;
    let jira = MockServer::start().await;

    mount_catalog_entry(&incident_io, "cat-a", "PIN-3").await;
    mount_catalog_entry(&incident_io, "cat-r", "OPS-8").await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/PIN-7"))
        .and(body_json(json!({
            "fields": { IMPACTED_FIELD: [{ "id": "ws-42:3", "objectId": "3" }] }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&jira)
        .await;
    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/PIN-7"))
        .and(body_json(json!({
            "fields": { RESPONSIBLE_FIELD: [{ "id": "ws-42:8", "objectId": "8" }] }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&jira)
        .await;

    let config = relay_config(&incident_io, &jira);
    let body = webhook_body(
        "public_incident.incident_updated_v2",
        "PIN-7",
        json!([
            field_entry("Responsible components", &["cat-r"]),
            field_entry("Impacted component", &["cat-a"])
        ]),
    );

    assert_eq!(post_webhook(&config, body).await, StatusCode::OK);
}

#[tokio::test]
async fn test_rejected_batch_falls_back_to_first_value() {
    let incident_io = MockServer::start().await;
    let jira = MockServer::start().await;

    mount_catalog_entry(&incident_io, "cat-a", "PIN-3").await;
    mount_catalog_entry(&incident_io, "cat-b", "PIN-4").await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/PIN-7"))
        .and(body_json(json!({
            "fields": {
                IMPACTED_FIELD: [
                    { "id": "ws-42:3", "objectId": "3" },
                    { "id": "ws-42:4", "objectId": "4" }
                ]
            }
        })))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "errors": { IMPACTED_FIELD: "Only one object allowed" } })),
        )
        .expect(1)
        .mount(&jira)
        .await;
    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/PIN-7"))
        .and(body_json(json!({
            "fields": { IMPACTED_FIELD: [{ "id": "ws-42:3", "objectId": "3" }] }
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&jira)
        .await;

    let config = relay_config(&incident_io, &jira);
    let body = webhook_body(
        "incident.custom_field_updated",
        "PIN-7",
        json!([field_entry("Impacted component", &["cat-a", "cat-b"])]),
    );

    assert_eq!(post_webhook(&config, body).await, StatusCode::OK);
}

#[tokio::test]
async fn test_unresolvable_value_is_dropped() {
    let incident_io = MockServer::start().await;
    let jira = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/catalog_entries/cat-gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&incident_io)
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&jira)
        .await;

    let config = relay_config(&incident_io, &jira);
    let body = webhook_body(
        "incident.custom_field_updated",
        "PIN-7",
        json!([field_entry("Impacted component", &["cat-gone"])]),
    );

    assert_eq!(post_webhook(&config, body).await, StatusCode::OK);
}

#[tokio::test]
async fn test_jira_failure_returns_server_error() {
    let incident_io = MockServer::start().await;
    let jira = MockServer::start().await;

    mount_catalog_entry(&incident_io, "cat-a", "PIN-3").await;

    Mock::given(method("PUT"))
        .and(path("/rest/api/3/issue/PIN-7"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .expect(1)
        .mount(&jira)
        .await;

    let config = relay_config(&incident_io, &jira);
    let body = webhook_body(
        "incident.custom_field_updated",
        "PIN-7",
        json!([field_entry("Impacted component", &["cat-a"])]),
    );

    assert_eq!(
        post_webhook(&config, body).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_ignored_event_makes_no_calls() {
    let incident_io = MockServer::start().await;
    let jira = MockServer::start().await;

    let config = relay_config(&incident_io, &jira);
    let body = json!({ "event_type": "public_incident.incident_created_v2" }).to_string();

    assert_eq!(post_webhook(&config, body).await, StatusCode::OK);
    assert!(incident_io.received_requests().await.unwrap_or_default().is_empty());
    assert!(jira.received_requests().await.unwrap_or_default().is_empty());
}
