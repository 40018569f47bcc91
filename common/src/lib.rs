//! endpoint-finder 共通定義
//!
//! 設定・リモート設定ドキュメント・共通型・エラー型

#![warn(missing_docs)]

/// 設定管理（ファイル + 環境変数）
pub mod config;

/// エラー型定義
pub mod error;

/// リモート設定ドキュメント
pub mod protocol;

/// 共通型定義
pub mod types;
