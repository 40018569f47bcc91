//! 共通型定義
//!
//! 論理キーとアドレス一覧のマッピング型

use std::collections::HashMap;

/// 論理キー → `host:port` アドレス一覧
///
/// シード設定・リモート設定・手動リセットの入力に共通して使う。
/// キーは呼び出し側が決める識別子（典型的にはサービスURL）。
pub type EndpointMap = HashMap<String, Vec<String>>;

/// `(キー, アドレス一覧)` の組から [`EndpointMap`] を構築する
///
/// 同じキーが複数回現れた場合はアドレスを後ろに連結する。
pub fn endpoint_map<K, I, A>(entries: impl IntoIterator<Item = (K, I)>) -> EndpointMap
where
    K: Into<String>,
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    let mut map = EndpointMap::new();
    for (key, addrs) in entries {
        map.entry(key.into())
            .or_default()
            .extend(addrs.into_iter().map(Into::into));
    }
    map
}

/// エンドポイント総数（全キー合計）
pub fn address_count(map: &EndpointMap) -> usize {
    map.values().map(Vec::len).sum()
}
