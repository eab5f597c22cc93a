use std::{sync::Arc, time::Duration};

use anyhow::Result;

use crate::{chain_client::ChainClient, http_client::HttpChainClient};

/// Hands out a client for an endpoint url. The relayer resolves the active
/// endpoint on every tick, so clients are never cached across failovers.
pub trait ChainConnector: Send + Sync {
    fn connect(&self, url: &str) -> Arc<dyn ChainClient>;
}

/// Connects over HTTP. All clients share one connection pool.
#[derive(Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
    expire_in_seconds: u32,
}

impl HttpConnector {
    pub fn new(timeout: Duration, expire_in_seconds: u32) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(HttpConnector {
            http,
            expire_in_seconds,
        })
    }

    pub fn connect_http(&self, url: &str) -> HttpChainClient {
        HttpChainClient::new(url, self.http.clone(), self.expire_in_seconds)
    }
}

impl ChainConnector for HttpConnector {
    fn connect(&self, url: &str) -> Arc<dyn ChainClient> {
        Arc::new(self.connect_http(url))
    }
}
