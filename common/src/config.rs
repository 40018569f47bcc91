//! 設定管理
//!
//! FinderConfig（取得・ヘルスチェック周期、タイムアウト、ワーカー数）
//!
//! 読み込み順（後勝ち）:
//! 1. 各フィールドのデフォルト値
//! 2. 設定ファイル（拡張子で形式判定: `.toml` / `.json` / `.yaml`）
//! 3. `ENDPOINT_FINDER_` で始まる環境変数（例: `ENDPOINT_FINDER_FETCH_INTERVAL_SECS=60`）

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CommonResult;

/// 環境変数のプレフィックス
pub const ENV_PREFIX: &str = "ENDPOINT_FINDER";

/// endpoint-finder設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FinderConfig {
    /// リモート設定URL（未設定なら定期取得を無効化）
    #[serde(default)]
    pub config_url: Option<String>,

    /// リモート設定の取得間隔（秒）(デフォルト: 1800)
    #[serde(default = "default_fetch_interval")]
    pub fetch_interval_secs: u64,

    /// リモート設定取得のタイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// ヘルスチェック間隔（秒）(デフォルト: 600)
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_secs: u64,

    /// TCP/UDPプローブのタイムアウト（秒）(デフォルト: 10)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// ヘルスチェックの同時実行ワーカー数 (デフォルト: 32)
    #[serde(default = "default_health_check_workers")]
    pub health_check_workers: usize,

    /// ヘルスチェックのジョブキュー容量 (デフォルト: 256)
    #[serde(default = "default_health_check_queue_capacity")]
    pub health_check_queue_capacity: usize,
}

fn default_fetch_interval() -> u64 {
    30 * 60
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_health_check_interval() -> u64 {
    10 * 60
}

fn default_probe_timeout() -> u64 {
    10
}

fn default_health_check_workers() -> usize {
    32
}

fn default_health_check_queue_capacity() -> usize {
    256
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            config_url: None,
            fetch_interval_secs: default_fetch_interval(),
            fetch_timeout_secs: default_fetch_timeout(),
            health_check_interval_secs: default_health_check_interval(),
            probe_timeout_secs: default_probe_timeout(),
            health_check_workers: default_health_check_workers(),
            health_check_queue_capacity: default_health_check_queue_capacity(),
        }
    }
}

impl FinderConfig {
    /// デフォルト値 → 設定ファイル → 環境変数の順に読み込む
    pub fn load(path: Option<&Path>) -> CommonResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// 空文字を除いたリモート設定URL
    pub fn config_url(&self) -> Option<&str> {
        self.config_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// リモート設定の取得間隔（最低1秒）
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_secs(self.fetch_interval_secs.max(1))
    }

    /// リモート設定取得のタイムアウト
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// ヘルスチェック間隔（最低1秒）
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_secs.max(1))
    }

    /// プローブのタイムアウト
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// ワーカー数（最低1）
    pub fn workers(&self) -> usize {
        self.health_check_workers.max(1)
    }

    /// キュー容量（最低1）
    pub fn queue_capacity(&self) -> usize {
        self.health_check_queue_capacity.max(1)
    }
}
