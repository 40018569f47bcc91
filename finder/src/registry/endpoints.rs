//! エンドポイントストア
//!
//! 論理キー → エンドポイント一覧のマッピングをスナップショットとして保持する。
//! 更新は常に新しいマッピング全体の差し替えで行い、読み手は差し替え前か後の
//! どちらか一方の完全なマッピングだけを観測する。

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

use crate::common::types::{address_count, EndpointMap};

/// エンドポイント
///
/// アドレスは生成後不変。稼働フラグはヘルスチェックのみが書き換える。
#[derive(Debug)]
pub struct Endpoint {
    address: String,
    healthy: AtomicBool,
}

impl Endpoint {
    /// 新しいエンドポイントを作成（初期状態は稼働中）
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            healthy: AtomicBool::new(true),
        }
    }

    /// `host:port` アドレス
    pub fn address(&self) -> &str {
        &self.address
    }

    /// 稼働中か
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// 稼働フラグを更新し、更新前の値を返す
    pub fn set_healthy(&self, healthy: bool) -> bool {
        self.healthy.swap(healthy, Ordering::AcqRel)
    }

    /// 現在の状態のコピー
    pub fn state(&self) -> EndpointState {
        EndpointState {
            address: self.address.clone(),
            healthy: self.is_healthy(),
        }
    }
}

/// エンドポイント状態（表示・ステータス出力用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointState {
    /// `host:port` アドレス
    pub address: String,
    /// 稼働中か
    pub healthy: bool,
}

/// 論理キー → エンドポイント一覧（順序はリモート設定・シードの記述順）
pub type EndpointTable = HashMap<String, Vec<Arc<Endpoint>>>;

/// エンドポイントストア
///
/// マッピング全体を1つのRwLockで保護する。中身は不変スナップショット
/// (`Arc<EndpointTable>`) で、`reset` はロック外で新テーブルを構築してから
/// 書き込みロック下でポインタだけを差し替える。
#[derive(Clone, Default)]
pub struct EndpointStore {
    table: Arc<RwLock<Arc<EndpointTable>>>,
}

impl EndpointStore {
    /// 空のストアを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// マッピングからストアを作成
    pub fn from_map(endpoints: EndpointMap) -> Self {
        let store = Self::new();
        store.reset(endpoints);
        store
    }

    /// マッピング全体を置き換える
    ///
    /// 全アドレスが稼働中の新しいエンドポイントになる。既存エンドポイントとの
    /// 差分は取らないため、稼働履歴は引き継がれない。
    pub fn reset(&self, endpoints: EndpointMap) {
        let key_count = endpoints.len();
        let endpoint_count = address_count(&endpoints);

        let table: EndpointTable = endpoints
            .into_iter()
            .map(|(key, addrs)| {
                let list = addrs
                    .into_iter()
                    .map(|addr| Arc::new(Endpoint::new(addr)))
                    .collect();
                (key, list)
            })
            .collect();

        *self.table.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(table);

        info!(
            key_count = key_count,
            endpoint_count = endpoint_count,
            "Endpoints reset"
        );
    }

    /// 現在のスナップショットを取得
    pub fn snapshot(&self) -> Arc<EndpointTable> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// キーのエンドポイント一覧を取得
    pub fn lookup(&self, key: &str) -> Option<Vec<Arc<Endpoint>>> {
        self.snapshot().get(key).cloned()
    }

    /// 登録キー数
    pub fn key_count(&self) -> usize {
        self.snapshot().len()
    }

    /// エンドポイント総数（全キー合計）
    pub fn endpoint_count(&self) -> usize {
        self.snapshot().values().map(Vec::len).sum()
    }

    /// 全キーの状態一覧（キー昇順）
    pub fn states(&self) -> BTreeMap<String, Vec<EndpointState>> {
        self.snapshot()
            .iter()
            .map(|(key, list)| (key.clone(), list.iter().map(|ep| ep.state()).collect()))
            .collect()
    }
}
