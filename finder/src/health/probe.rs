//! エンドポイントプローブ
//!
//! TCP段: `GET http://<address>` がレスポンスボディまで読めれば成功（ステータスは問わない）。
//! UDP段: 同じアドレスへ `HEALTH_CHECK\0` を送信できれば成功（応答は待たない）。

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use thiserror::Error;
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

/// UDPプローブで送信する固定ペイロード
pub const UDP_PROBE_PAYLOAD: &[u8] = b"HEALTH_CHECK\0";

/// プローブ段階
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStage {
    /// HTTP GET によるTCP到達性確認
    Tcp,
    /// データグラム送信によるUDP到達性確認
    Udp,
}

impl ProbeStage {
    /// 表示用文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStage::Tcp => "TCP",
            ProbeStage::Udp => "UDP",
        }
    }
}

impl fmt::Display for ProbeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// プローブエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProbeError {
    /// リクエストを構築できない（不正なアドレス等）
    #[error("TCP new request err: {0}")]
    TcpRequest(String),

    /// 接続・送信・タイムアウト
    #[error("TCP connect err: {0}")]
    TcpConnect(String),

    /// レスポンスボディの読み取り失敗
    #[error("TCP read err: {0}")]
    TcpRead(String),

    /// アドレス解決失敗
    #[error("UDP resolve err: {0}")]
    UdpResolve(String),

    /// ソケット作成・接続失敗
    #[error("UDP connect err: {0}")]
    UdpConnect(String),

    /// 送信失敗・タイムアウト
    #[error("UDP conn write err: {0}")]
    UdpWrite(String),
}

impl ProbeError {
    /// 失敗した段階
    pub fn stage(&self) -> ProbeStage {
        match self {
            ProbeError::TcpRequest(_) | ProbeError::TcpConnect(_) | ProbeError::TcpRead(_) => {
                ProbeStage::Tcp
            }
            ProbeError::UdpResolve(_) | ProbeError::UdpConnect(_) | ProbeError::UdpWrite(_) => {
                ProbeStage::Udp
            }
        }
    }
}

/// エンドポイントプローブ
///
/// 段階の順序（TCP → UDP）と公開IPの記録は [`HealthChecker`](super::HealthChecker) が
/// 受け持つため、実装は各段階の到達性確認だけを行う。
#[async_trait]
pub trait EndpointProber: Send + Sync {
    /// TCPプローブ。成功時はレスポンスボディを文字列として返す
    async fn probe_tcp(&self, address: &str) -> Result<String, ProbeError>;

    /// UDPプローブ
    async fn probe_udp(&self, address: &str) -> Result<(), ProbeError>;
}

/// 実ネットワークに対するプローブ
#[derive(Debug, Clone)]
pub struct NetworkProber {
    client: Client,
    timeout: Duration,
}

impl NetworkProber {
    /// タイムアウトを指定して作成
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl EndpointProber for NetworkProber {
    async fn probe_tcp(&self, address: &str) -> Result<String, ProbeError> {
        let url = Url::parse(&format!("http://{}", address))
            .map_err(|e| ProbeError::TcpRequest(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProbeError::TcpConnect(e.to_string()))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| ProbeError::TcpRead(e.to_string()))?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn probe_udp(&self, address: &str) -> Result<(), ProbeError> {
        let target = timeout(self.timeout, lookup_host(address))
            .await
            .map_err(|_| ProbeError::UdpResolve(format!("timed out resolving {}", address)))?
            .map_err(|e| ProbeError::UdpResolve(e.to_string()))?
            .next()
            .ok_or_else(|| ProbeError::UdpResolve(format!("no addresses for {}", address)))?;

        let local: SocketAddr = if target.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| ProbeError::UdpConnect(e.to_string()))?;
        socket
            .connect(target)
            .await
            .map_err(|e| ProbeError::UdpConnect(e.to_string()))?;

        timeout(self.timeout, socket.send(UDP_PROBE_PAYLOAD))
            .await
            .map_err(|_| ProbeError::UdpWrite("write deadline exceeded".to_string()))?
            .map_err(|e| ProbeError::UdpWrite(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn prober() -> NetworkProber {
        NetworkProber::new(Duration::from_secs(2)).unwrap()
    }

    async fn closed_port_address() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    #[test]
    fn test_error_stage() {
        assert_eq!(ProbeError::TcpConnect("x".into()).stage(), ProbeStage::Tcp);
        assert_eq!(ProbeError::TcpRead("x".into()).stage(), ProbeStage::Tcp);
        assert_eq!(ProbeError::UdpWrite("x".into()).stage(), ProbeStage::Udp);
        assert_eq!(ProbeStage::Udp.to_string(), "UDP");
    }

    #[test]
    fn test_payload_is_null_terminated() {
        assert_eq!(UDP_PROBE_PAYLOAD, b"HEALTH_CHECK\x00");
        assert_eq!(UDP_PROBE_PAYLOAD.len(), 13);
    }

    #[tokio::test]
    async fn test_tcp_probe_returns_body() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("203.0.113.7"))
            .mount(&mock)
            .await;

        let body = prober()
            .probe_tcp(&mock.address().to_string())
            .await
            .unwrap();

        assert_eq!(body, "203.0.113.7");
    }

    #[tokio::test]
    async fn test_tcp_probe_accepts_any_status() {
        let mock = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&mock)
            .await;

        let body = prober()
            .probe_tcp(&mock.address().to_string())
            .await
            .unwrap();

        assert_eq!(body, "not here");
    }

    #[tokio::test]
    async fn test_tcp_probe_connection_refused() {
        let address = closed_port_address().await;

        let err = prober().probe_tcp(&address).await.unwrap_err();

        assert!(matches!(err, ProbeError::TcpConnect(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_tcp_probe_rejects_malformed_address() {
        let err = prober().probe_tcp("not a host:port").await.unwrap_err();
        assert_eq!(err.stage(), ProbeStage::Tcp);
    }

    #[tokio::test]
    async fn test_udp_probe_sends_payload() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let address = receiver.local_addr().unwrap().to_string();

        prober().probe_udp(&address).await.unwrap();

        let mut buf = [0u8; 64];
        let (len, _) = timeout(Duration::from_secs(2), receiver.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(&buf[..len], UDP_PROBE_PAYLOAD);
    }

    #[tokio::test]
    async fn test_udp_probe_does_not_wait_for_reply() {
        // 受信側がいなくても送信自体は成功する
        let address = closed_port_address().await;
        assert!(prober().probe_udp(&address).await.is_ok());
    }

    #[tokio::test]
    async fn test_udp_probe_unresolvable_host() {
        let err = prober().probe_udp("no-port-here").await.unwrap_err();
        assert!(matches!(err, ProbeError::UdpResolve(_)), "got {:?}", err);
    }
}
