//! クライアント公開IPの保持
//!
//! TCPプローブ成功時のレスポンスボディ（プローブ先から見た自分のアドレス）を保持する。
//! 並行プローブのどれもが書き込むため、値は最後に完了した書き込みになる（後勝ち）。
//! 特定のエンドポイントとの対応関係は持たない。

use arc_swap::ArcSwapOption;
use std::sync::Arc;

/// 最後に観測したクライアント公開IP
///
/// ロックを使わずアトミックなポインタ差し替えで更新する。clone はすべて同じ値を共有する。
#[derive(Debug, Clone, Default)]
pub struct PublicIpCell {
    inner: Arc<ArcSwapOption<String>>,
}

impl PublicIpCell {
    /// 値を上書きする
    pub fn store(&self, ip: impl Into<String>) {
        self.inner.store(Some(Arc::new(ip.into())));
    }

    /// 最後に書き込まれた値
    pub fn load(&self) -> Option<String> {
        self.inner.load_full().map(|ip| ip.as_ref().clone())
    }
}
