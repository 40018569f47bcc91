use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// `GET /` にボディを返すプローブ先サーバーを起動する
#[allow(dead_code)]
pub async fn start_probe_target(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    server
}

/// `GET /endpoints.json` に設定を返す設定配信サーバーを起動する
#[allow(dead_code)]
pub async fn start_config_server(status: u16, body: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/endpoints.json"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(&server)
        .await;
    server
}

/// 設定配信サーバーの取得URL
#[allow(dead_code)]
pub fn config_url(server: &MockServer) -> String {
    format!("{}/endpoints.json", server.uri())
}

/// プローブ先の `host:port`
#[allow(dead_code)]
pub fn address_of(server: &MockServer) -> String {
    server.address().to_string()
}

/// 何も待ち受けていないローカルアドレス
#[allow(dead_code)]
pub async fn closed_address() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}
