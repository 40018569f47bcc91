//! テスト用サーバー・アドレスのユーティリティ

pub mod http;
