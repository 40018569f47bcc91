//! Public client interface.
//!
//! Thin facade over [`Manager`] for callers that only need the three public
//! operations.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::common::types::EndpointMap;
use crate::error::FinderResult;
use crate::manager::Manager;

/// Endpoint lookup client
pub trait EndpointClient: Send + Sync {
    /// Healthy address for `key`, or `None` when none is available
    fn get_endpoint(&self, key: &str) -> Option<String>;

    /// Replace the whole endpoint mapping
    fn reset_endpoints(&self, endpoints: EndpointMap);

    /// Last observed client public IP
    fn client_public_ip(&self) -> Option<String>;
}

/// [`EndpointClient`] backed by a [`Manager`]
#[derive(Clone)]
pub struct Client {
    manager: Arc<Manager>,
}

impl Client {
    /// Build a manager from local seeds and an optional remote config URL.
    ///
    /// Fails when the URL is set and the first fetch fails.
    pub async fn new(
        cancel: &CancellationToken,
        seeds: EndpointMap,
        config_url: Option<String>,
    ) -> FinderResult<Self> {
        let manager = Manager::new(cancel, seeds, config_url).await?;
        Ok(Self::from_manager(Arc::new(manager)))
    }

    /// Wrap an existing manager.
    pub fn from_manager(manager: Arc<Manager>) -> Self {
        Self { manager }
    }

    /// Underlying manager
    pub fn manager(&self) -> &Arc<Manager> {
        &self.manager
    }
}

impl EndpointClient for Client {
    fn get_endpoint(&self, key: &str) -> Option<String> {
        self.manager.select_one(key)
    }

    fn reset_endpoints(&self, endpoints: EndpointMap) {
        self.manager.reset_endpoints(endpoints);
    }

    fn client_public_ip(&self) -> Option<String> {
        self.manager.client_public_ip()
    }
}
