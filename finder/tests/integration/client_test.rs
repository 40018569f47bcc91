//! Client facade tests

use endpoint_finder::common::types::endpoint_map;
use endpoint_finder::{Client, EndpointClient};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::support::http::{address_of, config_url, start_config_server, start_probe_target};

#[tokio::test]
async fn test_client_with_remote_config() {
    let target = start_probe_target("192.0.2.99").await;
    let live = address_of(&target);
    let config_server = start_config_server(200, json!({ "svc": [live.clone()] })).await;

    let cancel = CancellationToken::new();
    let client = Client::new(&cancel, Default::default(), Some(config_url(&config_server)))
        .await
        .expect("client should start");

    assert_eq!(client.get_endpoint("svc").as_deref(), Some(live.as_str()));
    assert_eq!(client.client_public_ip().as_deref(), Some("192.0.2.99"));

    client.manager().shutdown().await;
}

#[tokio::test]
async fn test_client_reset_endpoints() {
    let cancel = CancellationToken::new();
    let client = Client::new(&cancel, endpoint_map([("svc", vec!["127.0.0.1:1"])]), None)
        .await
        .expect("client should start");

    client.reset_endpoints(endpoint_map([("svc", vec!["10.0.0.5:80"])]));

    assert_eq!(client.get_endpoint("svc").as_deref(), Some("10.0.0.5:80"));

    cancel.cancel();
}

#[tokio::test]
async fn test_client_fails_when_initial_fetch_fails() {
    let config_server = start_config_server(500, json!({"error": "boom"})).await;

    let result = Client::new(
        &CancellationToken::new(),
        Default::default(),
        Some(config_url(&config_server)),
    )
    .await;

    assert!(result.is_err());
}
