//! リモート設定同期モジュール
//!
//! 設定配信サーバーから論理キー → アドレス一覧を定期取得し、ストア全体を置き換える。
//!
//! # 処理フロー
//! 1. `GET <config_url>`（リクエスト単位のタイムアウト付き）
//! 2. ステータス200以外は失敗
//! 3. JSONオブジェクト `{"<key>": ["<host:port>", ...]}` をデコード
//! 4. [`EndpointStore::reset`] で全体を差し替え
//!
//! 失敗時はログを残してストアをそのまま残し、次のtickで再試行する（バックオフなし）。

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::common::config::FinderConfig;
use crate::common::error::CommonError;
use crate::common::protocol::EndpointDocument;
use crate::registry::EndpointStore;

const MIN_FETCH_INTERVAL: Duration = Duration::from_millis(1);

/// 取得エラー
#[derive(Debug, Error)]
pub enum FetchError {
    /// 接続・送信・タイムアウト・ボディ読み取り失敗
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// ステータス200以外
    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    /// JSONデコード失敗
    #[error("decode failed: {0}")]
    Decode(#[from] CommonError),
}

/// リモート設定フェッチャー
#[derive(Clone)]
pub struct ConfigFetcher {
    /// 置き換え対象のストア
    store: EndpointStore,
    /// HTTPクライアント（タイムアウト設定済み）
    client: Client,
    /// 取得先URL
    url: String,
    /// 取得間隔
    fetch_interval: Duration,
}

impl ConfigFetcher {
    /// 新しいフェッチャーを作成
    pub fn new(
        store: EndpointStore,
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            store,
            client,
            url: url.into(),
            fetch_interval: FinderConfig::default().fetch_interval(),
        })
    }

    /// 取得間隔を設定（最短1ms）
    pub fn with_interval(mut self, fetch_interval: Duration) -> Self {
        self.fetch_interval = fetch_interval.max(MIN_FETCH_INTERVAL);
        self
    }

    /// 取得先URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 1回取得してストアを置き換える
    ///
    /// 成功時は適用したキー数を返す。失敗時はストアに触れない。
    pub async fn fetch_once(&self) -> Result<usize, FetchError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        let endpoints = EndpointDocument::from_slice(&body)?.into_endpoint_map();
        let key_count = endpoints.len();

        self.store.reset(endpoints);

        debug!(url = %self.url, key_count = key_count, "Fetched endpoints");
        Ok(key_count)
    }

    /// バックグラウンドで定期取得を開始
    ///
    /// 初回取得は呼び出し側で済ませている前提で、最初の取得は1間隔後。
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.fetch_loop(cancel).await })
    }

    /// 取得ループ
    async fn fetch_loop(&self, cancel: CancellationToken) {
        let mut timer = interval(self.fetch_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            url = %self.url,
            interval_secs = self.fetch_interval.as_secs(),
            "Endpoint fetcher started"
        );

        // `interval()` の初回tickは即時に完了する
        timer.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = timer.tick() => {}
            }

            if let Err(e) = self.fetch_once().await {
                warn!(url = %self.url, error = %e, "Failed to fetch endpoints");
            }
        }

        info!(url = %self.url, "Endpoint fetcher stopped");
    }
}
