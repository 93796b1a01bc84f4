//! Integration tests for [`HttpClusterAdmin`] — wire contract, error mapping
//! and endpoint failover against a mock admin endpoint.

use std::collections::HashSet;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kaiju::admin::CLIENT_ID_HEADER;
use kaiju::{
    AdminConfig, ClusterAdmin, ClusterStateManager, ClusterStateView, HttpClusterAdmin,
    KaijuError, ListResourcesOptions, Node, RefreshConfig,
};

const CLIENT_ID: &str = "kaiju-test";

fn admin_for(servers: &[&MockServer]) -> HttpClusterAdmin {
    let bootstrap = servers
        .iter()
        .map(|s| s.uri())
        .collect::<Vec<_>>()
        .join(",");
    HttpClusterAdmin::new(&AdminConfig::new(bootstrap, CLIENT_ID)).unwrap()
}

fn description(name: &str, leader: i32) -> serde_json::Value {
    json!({
        "name": name,
        "internal": false,
        "partitions": [
            {"partition": 0, "leader": leader, "replicas": [1, 2], "isr": [1, 2]}
        ]
    })
}

async fn mount_healthy_cluster(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [
                {"id": 1, "host": "a", "port": 9092},
                {"id": 2, "host": "b", "port": 9092, "rack": "r2"}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/resources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [
                {"name": "orders", "internal": false},
                {"name": "users", "internal": false}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/resources/describe"))
        .and(body_json(json!({"names": ["orders", "users"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "descriptions": {
                "orders": description("orders", 1),
                "users": description("users", 2)
            }
        })))
        .mount(server)
        .await;
}

// =============================================================================
// Wire contract
// =============================================================================

#[tokio::test]
async fn describe_cluster_sends_client_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cluster"))
        .and(header(CLIENT_ID_HEADER, CLIENT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nodes": [{"id": 1, "host": "a", "port": 9092, "rack": "r1"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let nodes = admin_for(&[&server]).describe_cluster().await.unwrap();
    assert_eq!(nodes, vec![Node::new(1, "a", 9092).with_rack("r1")]);
}

#[tokio::test]
async fn null_nodes_read_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nodes": null})))
        .mount(&server)
        .await;

    let nodes = admin_for(&[&server]).describe_cluster().await.unwrap();
    assert!(nodes.is_empty());
}

#[tokio::test]
async fn list_resources_passes_internal_flag() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/resources"))
        .and(query_param("include_internal", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": [
                {"name": "__consumer_offsets", "internal": true},
                {"name": "orders"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let listings = admin_for(&[&server])
        .list_resources(&ListResourcesOptions::new().include_internal(true))
        .await
        .unwrap();
    assert_eq!(listings.len(), 2);
    assert!(listings[0].internal);
    assert!(!listings[1].internal);
}

#[tokio::test]
async fn describe_resources_posts_names() {
    let server = MockServer::start().await;
    mount_healthy_cluster(&server).await;

    let descriptions = admin_for(&[&server])
        .describe_resources(&["orders".to_string(), "users".to_string()])
        .await
        .unwrap();
    assert_eq!(descriptions.len(), 2);
    assert_eq!(descriptions["users"].partitions[0].leader, Some(2));
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cluster"))
        .respond_with(ResponseTemplate::new(500).set_body_string("controller unavailable"))
        .mount(&server)
        .await;

    let err = admin_for(&[&server]).describe_cluster().await.unwrap_err();
    match err {
        KaijuError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("controller unavailable"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_maps_to_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = admin_for(&[&server]).describe_cluster().await.unwrap_err();
    assert!(matches!(err, KaijuError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_transient_http_error() {
    let admin = HttpClusterAdmin::new(&AdminConfig::new("127.0.0.1:1", CLIENT_ID)).unwrap();
    let err = admin.describe_cluster().await.unwrap_err();
    assert!(matches!(err, KaijuError::Http(_)), "got {err:?}");
    assert!(err.is_transient());
}

// =============================================================================
// Failover
// =============================================================================

#[tokio::test]
async fn fails_over_to_next_endpoint() {
    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&broken)
        .await;
    let healthy = MockServer::start().await;
    mount_healthy_cluster(&healthy).await;

    let nodes = admin_for(&[&broken, &healthy])
        .describe_cluster()
        .await
        .unwrap();
    assert_eq!(nodes.len(), 2);
}

#[tokio::test]
async fn all_endpoints_failing_returns_last_error() {
    let first = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&first)
        .await;
    let second = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&second)
        .await;

    let err = admin_for(&[&first, &second])
        .describe_cluster()
        .await
        .unwrap_err();
    assert!(matches!(err, KaijuError::Api { status: 502, .. }), "got {err:?}");
}

#[tokio::test]
async fn closed_client_sends_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/cluster"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nodes": []})))
        .expect(0)
        .mount(&server)
        .await;

    let admin = admin_for(&[&server]);
    admin.close();

    assert!(admin.is_closed());
    let err = admin.describe_cluster().await.unwrap_err();
    assert!(matches!(err, KaijuError::ClientClosed));
    let err = admin
        .list_resources(&ListResourcesOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, KaijuError::ClientClosed));
}

// =============================================================================
// End to end through the manager
// =============================================================================

#[tokio::test]
async fn manager_refresh_over_http() {
    let server = MockServer::start().await;
    mount_healthy_cluster(&server).await;

    let manager = ClusterStateManager::with_admin_config(
        &AdminConfig::new(server.uri(), CLIENT_ID),
        RefreshConfig::default(),
    )
    .unwrap();

    let outcome = manager.refresh().await;
    assert!(outcome.is_complete(), "{outcome:?}");
    assert_eq!(manager.node_ids(), HashSet::from([1, 2]));
    assert_eq!(
        manager.resource_names(),
        HashSet::from(["orders".to_string(), "users".to_string()])
    );

    assert_eq!(manager.summary().nodes, 2);
    manager.shutdown().await;
}
