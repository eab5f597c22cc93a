use std::sync::Arc;

use async_trait::async_trait;
use sr_rpc_client::ChainClient;

/// Whether the local chain node is up. Relaying is only attempted while it is.
#[async_trait]
pub trait NodeProbe: Send + Sync {
    async fn is_alive(&self) -> bool;
}

/// Asks the local node for its chain info.
pub struct ChainNodeProbe {
    client: Arc<dyn ChainClient>,
}

impl ChainNodeProbe {
    pub fn new(client: Arc<dyn ChainClient>) -> Self {
        ChainNodeProbe { client }
    }
}

#[async_trait]
impl NodeProbe for ChainNodeProbe {
    async fn is_alive(&self) -> bool {
        match self.client.get_chain_info().await {
            Ok(_) => true,
            Err(err) => {
                log::warn!("local node is not alive: {}", err);
                false
            }
        }
    }
}
