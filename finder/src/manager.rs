//! Endpoint manager.
//!
//! Owns the endpoint store and the two background loops (remote fetch and
//! health check), and exposes selection, forced reset, and the last observed
//! client public IP.
//!
//! Construction order:
//! 1. seed the store
//! 2. if a config URL is set, fetch it once and fail construction on error
//! 3. run one health check sweep
//! 4. start the periodic loops under a child of the caller's cancellation token

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::balancer::Selector;
use crate::common::config::FinderConfig;
use crate::common::types::EndpointMap;
use crate::error::FinderResult;
use crate::health::{EndpointProber, HealthChecker, NetworkProber};
use crate::ip::PublicIpCell;
use crate::registry::{EndpointState, EndpointStore};
use crate::sync::ConfigFetcher;

/// Endpoint manager.
///
/// Dropping the manager cancels its background loops.
pub struct Manager {
    store: EndpointStore,
    selector: Selector,
    public_ip: PublicIpCell,
    config_url: Option<String>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Manager {
    /// Create a manager with default intervals and timeouts.
    pub async fn new(
        cancel: &CancellationToken,
        seeds: EndpointMap,
        config_url: Option<String>,
    ) -> FinderResult<Self> {
        let config = FinderConfig {
            config_url,
            ..Default::default()
        };
        Self::with_config(cancel, seeds, &config).await
    }

    /// Create a manager probing the real network.
    pub async fn with_config(
        cancel: &CancellationToken,
        seeds: EndpointMap,
        config: &FinderConfig,
    ) -> FinderResult<Self> {
        let prober = NetworkProber::new(config.probe_timeout())?;
        Self::with_prober(cancel, seeds, config, Arc::new(prober)).await
    }

    /// Create a manager with a custom prober.
    pub async fn with_prober(
        cancel: &CancellationToken,
        seeds: EndpointMap,
        config: &FinderConfig,
        prober: Arc<dyn EndpointProber>,
    ) -> FinderResult<Self> {
        let store = EndpointStore::from_map(seeds);
        let public_ip = PublicIpCell::default();
        let cancel = cancel.child_token();

        let fetcher = match config.config_url() {
            Some(url) => Some(
                ConfigFetcher::new(store.clone(), url, config.fetch_timeout())?
                    .with_interval(config.fetch_interval()),
            ),
            None => {
                info!("No endpoint config URL set, remote fetch disabled");
                None
            }
        };

        if let Some(fetcher) = &fetcher {
            if let Err(e) = fetcher.fetch_once().await {
                error!(url = %fetcher.url(), error = %e, "Initial endpoint fetch failed");
                return Err(e.into());
            }
        }

        let checker = HealthChecker::new(store.clone(), prober, public_ip.clone())
            .with_interval(config.health_check_interval())
            .with_workers(config.workers(), config.queue_capacity());
        checker.sweep(&cancel).await;

        let mut tasks = vec![checker.start(cancel.clone())];
        if let Some(fetcher) = fetcher {
            tasks.push(fetcher.start(cancel.clone()));
        }

        info!(
            key_count = store.key_count(),
            endpoint_count = store.endpoint_count(),
            "Endpoint manager started"
        );

        Ok(Self {
            selector: Selector::new(store.clone()),
            store,
            public_ip,
            config_url: config.config_url().map(str::to_string),
            cancel,
            tasks: Mutex::new(tasks),
        })
    }

    /// Pick a healthy address for `key`, or `None` if there is none.
    pub fn select_one(&self, key: &str) -> Option<String> {
        self.selector.select_one(key)
    }

    /// Replace the whole endpoint mapping right away. Every address starts healthy.
    pub fn reset_endpoints(&self, endpoints: EndpointMap) {
        self.store.reset(endpoints);
    }

    /// Last client public IP reported by any successful TCP probe.
    pub fn client_public_ip(&self) -> Option<String> {
        self.public_ip.load()
    }

    /// Remote config URL, if fetching is enabled.
    pub fn config_url(&self) -> Option<&str> {
        self.config_url.as_deref()
    }

    /// Current endpoints and health flags, sorted by key.
    pub fn endpoints(&self) -> BTreeMap<String, Vec<EndpointState>> {
        self.store.states()
    }

    /// Token governing the background loops.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel the background loops and wait for them to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        for task in tasks {
            if let Err(e) = task.await {
                error!("Background task join error: {}", e);
            }
        }

        info!("Endpoint manager stopped");
    }
}

impl Drop for Manager {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
