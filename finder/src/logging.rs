//! ロギング初期化ユーティリティ
//!
//! ログレベルは `ENDPOINT_FINDER_LOG_LEVEL` → `RUST_LOG` → `info` の順に決まる。

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベル指定用の環境変数
pub const LOG_LEVEL_ENV: &str = "ENDPOINT_FINDER_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";

/// 環境変数からフィルタを構築
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_LEVEL_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// グローバルsubscriberを初期化（標準エラー出力）
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()?;
    Ok(())
}
