//! ロードバランサー（稼働中エンドポイントからの一様ランダム選択）
//!
//! 選択はストアのスナップショットに対する同期的な読み取りのみで、I/Oでブロックせず、
//! 状態も変更しない。返したアドレスの稼働フラグが直後に変わっている可能性はある。

use rand::RngExt;
use std::sync::Arc;

use crate::registry::{Endpoint, EndpointStore};

/// 稼働中エンドポイントのセレクター
#[derive(Clone)]
pub struct Selector {
    store: EndpointStore,
}

impl Selector {
    /// 新しいセレクターを作成
    pub fn new(store: EndpointStore) -> Self {
        Self { store }
    }

    /// キーに対応する稼働中アドレスを1つ選ぶ
    ///
    /// キーが存在しない、または稼働中エンドポイントが0件の場合は `None`。
    pub fn select_one(&self, key: &str) -> Option<String> {
        let endpoints = self.store.lookup(key)?;

        let healthy: Vec<&Arc<Endpoint>> = endpoints.iter().filter(|ep| ep.is_healthy()).collect();
        if healthy.is_empty() {
            return None;
        }

        let mut rng = rand::rng();
        let idx = rng.random_range(0..healthy.len());
        Some(healthy[idx].address().to_string())
    }
}
