//! エンドポイントヘルスチェッカー
//!
//! プル型ヘルスチェックでエンドポイントの稼働状況を監視
//!
//! 1回のスイープではストアのスナップショットを取り、全キーの全エンドポイントを
//! 固定数のワーカーで並列にプローブし、全件の完了を待ってから戻る。
//! ワーカーは容量固定のジョブキューからエンドポイントを取り出すため、
//! 同時に開くソケット数はワーカー数で上限が決まる。

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::probe::{EndpointProber, ProbeError};
use crate::common::config::FinderConfig;
use crate::ip::PublicIpCell;
use crate::registry::{Endpoint, EndpointStore};

type JobQueue = Arc<Mutex<mpsc::Receiver<Arc<Endpoint>>>>;

const MIN_CHECK_INTERVAL: Duration = Duration::from_millis(1);

/// スイープ結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// スイープ開始時刻
    pub checked_at: DateTime<Utc>,
    /// 対象エンドポイント数
    pub total: usize,
    /// 稼働中と判定した数
    pub healthy: usize,
    /// 停止中と判定した数
    pub unhealthy: usize,
    /// キャンセルによりプローブしなかった数（フラグは据え置き）
    pub skipped: usize,
}

impl SweepReport {
    fn empty(checked_at: DateTime<Utc>, total: usize) -> Self {
        Self {
            checked_at,
            total,
            healthy: 0,
            unhealthy: 0,
            skipped: 0,
        }
    }
}

#[derive(Debug, Default)]
struct WorkerTally {
    healthy: usize,
    unhealthy: usize,
    skipped: usize,
}

/// エンドポイントヘルスチェッカー
#[derive(Clone)]
pub struct HealthChecker {
    /// エンドポイントストア
    store: EndpointStore,
    /// TCP/UDPプローブ
    prober: Arc<dyn EndpointProber>,
    /// TCPプローブ成功時に書き込む公開IP
    public_ip: PublicIpCell,
    /// チェック間隔
    check_interval: Duration,
    /// ワーカー数
    workers: usize,
    /// ジョブキュー容量
    queue_capacity: usize,
}

impl HealthChecker {
    /// 新しいヘルスチェッカーを作成
    pub fn new(store: EndpointStore, prober: Arc<dyn EndpointProber>, public_ip: PublicIpCell) -> Self {
        let defaults = FinderConfig::default();
        Self {
            store,
            prober,
            public_ip,
            check_interval: defaults.health_check_interval(),
            workers: defaults.workers(),
            queue_capacity: defaults.queue_capacity(),
        }
    }

    /// チェック間隔を設定
    ///
    /// `interval()` はゼロ周期でpanicするため、最短1msに切り上げる。
    pub fn with_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval.max(MIN_CHECK_INTERVAL);
        self
    }

    /// ワーカー数とキュー容量を設定（それぞれ最低1）
    pub fn with_workers(mut self, workers: usize, queue_capacity: usize) -> Self {
        self.workers = workers.max(1);
        self.queue_capacity = queue_capacity.max(1);
        self
    }

    /// バックグラウンドで監視を開始
    ///
    /// 初回スイープは呼び出し側で済ませている前提で、最初のチェックは1間隔後。
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.monitor_loop(cancel).await })
    }

    /// 監視ループ
    async fn monitor_loop(&self, cancel: CancellationToken) {
        let mut timer = interval(self.check_interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.check_interval.as_secs(),
            workers = self.workers,
            "Endpoint health checker started"
        );

        // `interval()` の初回tickは即時に完了する
        timer.tick().await;

        loop {
            // 両方が準備完了ならキャンセルを優先する
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = timer.tick() => {}
            }

            self.sweep(&cancel).await;
        }

        info!("Endpoint health checker stopped");
    }

    /// 全エンドポイントを1回チェック
    ///
    /// 全プローブの完了を待ってから戻る。キャンセル後にキューから取り出した
    /// エンドポイントはプローブせず、稼働フラグもそのまま残す。
    pub async fn sweep(&self, cancel: &CancellationToken) -> SweepReport {
        let checked_at = Utc::now();
        let table = self.store.snapshot();
        let endpoints: Vec<Arc<Endpoint>> = table.values().flatten().cloned().collect();
        let total = endpoints.len();
        let mut report = SweepReport::empty(checked_at, total);

        if endpoints.is_empty() {
            info!("No endpoints to check");
            return report;
        }

        let worker_count = self.workers.min(total);
        debug!(
            count = total,
            workers = worker_count,
            "Starting health check sweep"
        );

        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let queue: JobQueue = Arc::new(Mutex::new(rx));

        let handles: Vec<_> = (0..worker_count)
            .map(|worker_id| {
                let checker = self.clone();
                let queue = queue.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { checker.run_worker(worker_id, queue, cancel).await })
            })
            .collect();
        // 全ワーカーが落ちた場合に送信側が詰まらないよう、受信側の参照はワーカーだけが持つ
        drop(queue);

        for endpoint in endpoints {
            if tx.send(endpoint).await.is_err() {
                error!("Health check job queue closed before all endpoints were queued");
                break;
            }
        }
        drop(tx);

        for result in join_all(handles).await {
            match result {
                Ok(tally) => {
                    report.healthy += tally.healthy;
                    report.unhealthy += tally.unhealthy;
                    report.skipped += tally.skipped;
                }
                Err(e) => error!("Health check worker join error: {}", e),
            }
        }

        info!(
            total = report.total,
            healthy = report.healthy,
            unhealthy = report.unhealthy,
            skipped = report.skipped,
            "Health check sweep completed"
        );

        report
    }

    async fn run_worker(
        &self,
        worker_id: usize,
        queue: JobQueue,
        cancel: CancellationToken,
    ) -> WorkerTally {
        let mut tally = WorkerTally::default();

        loop {
            let next = queue.lock().await.recv().await;
            let Some(endpoint) = next else {
                break;
            };

            if cancel.is_cancelled() {
                tally.skipped += 1;
                continue;
            }

            if self.check_endpoint(&endpoint).await {
                tally.healthy += 1;
            } else {
                tally.unhealthy += 1;
            }
        }

        debug!(worker_id = worker_id, "Health check worker finished");
        tally
    }

    /// 単一エンドポイントのヘルスチェック
    ///
    /// 稼働フラグを更新し、判定結果を返す。
    pub async fn check_endpoint(&self, endpoint: &Endpoint) -> bool {
        let result = self.probe(endpoint.address()).await;
        let healthy = result.is_ok();
        let was_healthy = endpoint.set_healthy(healthy);

        match &result {
            Ok(()) => debug!(address = %endpoint.address(), "Health check succeeded"),
            Err(e) => warn!(
                address = %endpoint.address(),
                stage = %e.stage(),
                error = %e,
                "Health check failed"
            ),
        }

        if was_healthy != healthy {
            info!(
                address = %endpoint.address(),
                healthy = healthy,
                "Endpoint health changed"
            );
        }

        healthy
    }

    /// TCP → UDP の順にプローブ
    ///
    /// TCP成功時点で公開IPを書き込む（UDPの結果には依存しない）。
    async fn probe(&self, address: &str) -> Result<(), ProbeError> {
        let body = self.prober.probe_tcp(address).await?;
        self.public_ip.store(body);
        self.prober.probe_udp(address).await
    }
}
