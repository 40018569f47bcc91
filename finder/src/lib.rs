//! endpoint-finder
//!
//! 論理キーごとに、定期的にヘルスチェックされたエンドポイント群から
//! 稼働中のアドレスを1つ選択するクライアントサイドのサービスディスカバリ

#![warn(missing_docs)]

pub use endpoint_finder_common as common;

/// エラー型
pub mod error;

/// エンドポイントストア（論理キー → エンドポイント一覧）
pub mod registry;

/// 稼働中エンドポイントのランダム選択
pub mod balancer;

/// ヘルスチェック（TCP → UDP プローブ）
pub mod health;

/// リモート設定の定期取得
pub mod sync;

/// クライアント公開IPの保持
pub mod ip;

/// ストアとバックグラウンドループのオーケストレーション
pub mod manager;

/// 公開クライアントインターフェース
pub mod client;

/// ロギング初期化ユーティリティ
pub mod logging;

/// CLIインターフェース
pub mod cli;

pub use client::{Client, EndpointClient};
pub use error::{FinderError, FinderResult};
pub use manager::Manager;
