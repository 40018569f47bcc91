//! エンドポイント登録管理
//!
//! 論理キーごとのエンドポイント一覧をメモリ内で保持する

pub mod endpoints;

pub use endpoints::{Endpoint, EndpointState, EndpointStore, EndpointTable};
