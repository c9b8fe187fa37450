//! Runtime fleet administration over the admin API.

use std::net::SocketAddr;
use std::sync::Arc;

use load_balancer::balancer::pool::ServerPool;
use load_balancer::balancer::StrategyKind;
use load_balancer::config::BalancerConfig;
use load_balancer::http::HttpServer;
use load_balancer::lifecycle::Shutdown;

mod common;

async fn start_proxy(pool: Arc<ServerPool>, shutdown: &Shutdown) -> SocketAddr {
    let mut config = BalancerConfig::default();
    config.health_check.enabled = false;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, pool, None);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    common::settle().await;
    addr
}

#[tokio::test]
async fn added_backend_joins_the_rotation() {
    let b1 = common::start_mock_backend("backend-one").await;
    let b2 = common::start_mock_backend("backend-two").await;

    let pool = Arc::new(ServerPool::new(StrategyKind::RoundRobin));
    pool.add_backend_addr(&format!("http://{}", b1), 1).unwrap();

    let shutdown = Shutdown::new();
    let proxy = start_proxy(pool, &shutdown).await;
    let client = reqwest::Client::new();

    let created = client
        .post(format!("http://{}/admin/backends", proxy))
        .json(&serde_json::json!({ "address": format!("http://{}", b2), "weight": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(created.status(), 201);

    let listed: Vec<serde_json::Value> = client
        .get(format!("http://{}/admin/backends", proxy))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);

    // The new backend shows up in the rotation.
    let mut bodies = std::collections::HashSet::new();
    for _ in 0..4 {
        let body = client
            .get(format!("http://{}", proxy))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        bodies.insert(body);
    }
    assert!(bodies.contains("backend-two"));
    shutdown.trigger();
}

#[tokio::test]
async fn removed_backend_stops_receiving_traffic() {
    let b1 = common::start_mock_backend("backend-one").await;
    let b2 = common::start_mock_backend("backend-two").await;
    let b1_url = format!("http://{}", b1);

    let pool = Arc::new(ServerPool::new(StrategyKind::RoundRobin));
    pool.add_backend_addr(&b1_url, 1).unwrap();
    pool.add_backend_addr(&format!("http://{}", b2), 1).unwrap();

    let shutdown = Shutdown::new();
    let proxy = start_proxy(pool, &shutdown).await;
    let client = reqwest::Client::new();

    let removed = client
        .delete(format!("http://{}/admin/backends", proxy))
        .json(&serde_json::json!({ "address": b1_url }))
        .send()
        .await
        .unwrap();
    assert_eq!(removed.status(), 204);

    for _ in 0..4 {
        let body = client
            .get(format!("http://{}", proxy))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "backend-two");
    }
    shutdown.trigger();
}

#[tokio::test]
async fn removing_unknown_backend_is_not_found() {
    let pool = Arc::new(ServerPool::new(StrategyKind::RoundRobin));
    let shutdown = Shutdown::new();
    let proxy = start_proxy(pool, &shutdown).await;

    let response = reqwest::Client::new()
        .delete(format!("http://{}/admin/backends", proxy))
        .json(&serde_json::json!({ "address": "http://127.0.0.1:1/" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    shutdown.trigger();
}

#[tokio::test]
async fn strategy_swap_over_the_api() {
    let backend = common::start_mock_backend("ok").await;
    let pool = Arc::new(ServerPool::new(StrategyKind::RoundRobin));
    pool.add_backend_addr(&format!("http://{}", backend), 1)
        .unwrap();

    let shutdown = Shutdown::new();
    let proxy = start_proxy(pool.clone(), &shutdown).await;
    let client = reqwest::Client::new();

    let swapped = client
        .put(format!("http://{}/admin/strategy", proxy))
        .json(&serde_json::json!({ "strategy": "least_connections" }))
        .send()
        .await
        .unwrap();
    assert_eq!(swapped.status(), 200);
    assert_eq!(pool.strategy_kind(), StrategyKind::LeastConnections);

    let rejected = client
        .put(format!("http://{}/admin/strategy", proxy))
        .json(&serde_json::json!({ "strategy": "fastest" }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), 400);
    shutdown.trigger();
}
