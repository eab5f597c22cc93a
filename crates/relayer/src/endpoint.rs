use std::sync::Arc;

use sr_config::ChainEndpointConfig;
use sr_rpc_client::{ChainClient, ChainConnector};
use tracing::instrument;

use crate::events::{EventSink, RelayEvent};

/// Endpoints of one logical chain.
///
/// `active_url` is always the configured url or one of `seed_urls`. The set
/// lives as long as the process and is only written by
/// [`EndpointFailoverManager`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEndpointSet {
    chain_name: String,
    active_url: String,
    seed_urls: Vec<String>,
    consecutive_failures: u32,
    failure_threshold: u32,
}

impl ChainEndpointSet {
    pub fn new(
        chain_name: impl Into<String>,
        url: impl Into<String>,
        seed_urls: Vec<String>,
        failure_threshold: u32,
    ) -> Self {
        ChainEndpointSet {
            chain_name: chain_name.into(),
            active_url: url.into(),
            seed_urls,
            consecutive_failures: 0,
            failure_threshold,
        }
    }

    pub fn from_config(
        chain_name: impl Into<String>,
        config: &ChainEndpointConfig,
        failure_threshold: u32,
    ) -> Self {
        Self::new(
            chain_name,
            config.url.clone(),
            config.seed_urls.clone(),
            failure_threshold,
        )
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    pub fn active_url(&self) -> &str {
        &self.active_url
    }

    pub fn seed_urls(&self) -> &[String] {
        &self.seed_urls
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

/// Probes the active endpoint of a chain and rotates to a seed after more
/// than `failure_threshold` consecutive failures.
pub struct EndpointFailoverManager {
    connector: Arc<dyn ChainConnector>,
    events: Arc<dyn EventSink>,
}

impl EndpointFailoverManager {
    pub fn new(connector: Arc<dyn ChainConnector>, events: Arc<dyn EventSink>) -> Self {
        EndpointFailoverManager { connector, events }
    }

    /// Client of the currently active endpoint.
    pub fn client(&self, endpoints: &ChainEndpointSet) -> Arc<dyn ChainClient> {
        self.connector.connect(&endpoints.active_url)
    }

    async fn is_responsive(&self, url: &str) -> bool {
        match self.connector.connect(url).get_chain_info().await {
            Ok(_) => true,
            Err(err) if err.is_connection_error() => {
                log::debug!("probe {}: {}", url, err);
                false
            }
            // the node answered, so the endpoint itself is reachable
            Err(err) => {
                log::warn!("probe {} answered with an error: {}", url, err);
                true
            }
        }
    }

    /// Returns whether the chain ends up with a responsive active endpoint.
    #[instrument(skip_all, fields(chain = %endpoints.chain_name, url = %endpoints.active_url))]
    pub async fn probe(&self, endpoints: &mut ChainEndpointSet) -> bool {
        if self.is_responsive(&endpoints.active_url).await {
            endpoints.consecutive_failures = 0;
            return true;
        }

        endpoints.consecutive_failures += 1;
        if endpoints.consecutive_failures <= endpoints.failure_threshold {
            log::warn!(
                "[{}] endpoint {} failed {}/{} probes",
                endpoints.chain_name,
                endpoints.active_url,
                endpoints.consecutive_failures,
                endpoints.failure_threshold
            );
            return false;
        }

        endpoints.consecutive_failures = 0;
        for seed in endpoints.seed_urls.iter() {
            if !self.is_responsive(seed).await {
                continue;
            }

            let old_url = std::mem::replace(&mut endpoints.active_url, seed.clone());
            self.events.emit(RelayEvent::EndpointFailedOver {
                chain_name: endpoints.chain_name.clone(),
                old_url,
                new_url: seed.clone(),
            });
            return true;
        }

        log::error!(
            "[{}] no responsive seed, keep using {}",
            endpoints.chain_name,
            endpoints.active_url
        );
        false
    }
}
