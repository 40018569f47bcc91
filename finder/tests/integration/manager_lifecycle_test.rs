//! Manager lifecycle against real sockets

use endpoint_finder::common::config::FinderConfig;
use endpoint_finder::common::types::endpoint_map;
use endpoint_finder::Manager;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::support::http::{address_of, closed_address, config_url, start_config_server, start_probe_target};

fn config_for(url: Option<String>) -> FinderConfig {
    FinderConfig {
        config_url: url,
        probe_timeout_secs: 2,
        fetch_timeout_secs: 2,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_remote_config_then_probe_marks_closed_port_unhealthy() {
    let target = start_probe_target("203.0.113.7").await;
    let live = address_of(&target);
    let dead = closed_address().await;
    let config_server =
        start_config_server(200, json!({ "https://svc.example.com": [live.clone(), dead.clone()] })).await;

    let cancel = CancellationToken::new();
    let manager = Manager::with_config(
        &cancel,
        endpoint_map([("seed-only", vec!["127.0.0.1:1"])]),
        &config_for(Some(config_url(&config_server))),
    )
    .await
    .expect("manager should start");

    // 取得後のマッピングでシードは置き換わる
    assert_eq!(manager.select_one("seed-only"), None);
    for _ in 0..20 {
        assert_eq!(manager.select_one("https://svc.example.com").as_deref(), Some(live.as_str()));
    }
    assert_eq!(manager.client_public_ip().as_deref(), Some("203.0.113.7"));

    let states = manager.endpoints();
    let list = &states["https://svc.example.com"];
    assert_eq!(list.len(), 2);
    assert!(list.iter().any(|s| s.address == dead && !s.healthy));
    assert!(list.iter().any(|s| s.address == live && s.healthy));

    manager.shutdown().await;
}

#[tokio::test]
async fn test_seeds_only_without_url() {
    let target = start_probe_target("198.51.100.1").await;
    let live = address_of(&target);

    let cancel = CancellationToken::new();
    let manager = Manager::with_config(&cancel, endpoint_map([("svc", vec![live.clone()])]), &config_for(None))
        .await
        .expect("manager should start");

    assert_eq!(manager.config_url(), None);
    assert_eq!(manager.select_one("svc").as_deref(), Some(live.as_str()));
    assert_eq!(manager.client_public_ip().as_deref(), Some("198.51.100.1"));

    manager.shutdown().await;
}

#[tokio::test]
async fn test_all_endpoints_down_selects_none() {
    let dead = closed_address().await;

    let cancel = CancellationToken::new();
    let manager = Manager::with_config(&cancel, endpoint_map([("svc", vec![dead])]), &config_for(None))
        .await
        .expect("manager should start");

    assert_eq!(manager.select_one("svc"), None);
    assert_eq!(manager.client_public_ip(), None);

    manager.shutdown().await;
}

#[tokio::test]
async fn test_initial_fetch_error_status_fails_startup() {
    let config_server = start_config_server(503, json!({})).await;

    let result = Manager::with_config(
        &CancellationToken::new(),
        endpoint_map([("svc", vec!["127.0.0.1:1"])]),
        &config_for(Some(config_url(&config_server))),
    )
    .await;

    assert!(result.is_err());
}
