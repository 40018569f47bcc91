//! ヘルスチェックモニター
//!
//! 定期的に全エンドポイントの到達性を確認する。
//! 各エンドポイントはTCPプローブ（`GET http://<address>`）成功後にUDPプローブを行い、
//! 両方成功した場合のみ稼働中とする。

pub mod endpoint_checker;
pub mod probe;

pub use endpoint_checker::{HealthChecker, SweepReport};
pub use probe::{EndpointProber, NetworkProber, ProbeError, ProbeStage, UDP_PROBE_PAYLOAD};
