use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

use crate::constants::*;

/// Hex encoded secp256k1 secret key. Never printed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKeyHex(String);

impl PrivateKeyHex {
    pub fn new(hex: impl Into<String>) -> Self {
        PrivateKeyHex(hex.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKeyHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyHex(<redacted>)")
    }
}

/// Endpoint and credentials of one chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainEndpointConfig {
    /// Endpoint used until failover picks a seed.
    pub url: String,
    #[serde(default)]
    pub seed_urls: Vec<String>,
    /// Account authorizing transactions pushed to this chain.
    pub committee_account: String,
    pub committee_key: PrivateKeyHex,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainChainConfig {
    /// Chain scope used to filter the local producer list.
    #[serde(default = "default_main_chain_name")]
    pub name: String,
    #[serde(flatten)]
    pub endpoint: ChainEndpointConfig,
}

fn default_main_chain_name() -> String {
    DEFAULT_MAIN_CHAIN_NAME.to_string()
}

impl Default for MainChainConfig {
    fn default() -> Self {
        MainChainConfig {
            name: default_main_chain_name(),
            endpoint: ChainEndpointConfig {
                url: "http://127.0.0.1:8888".to_string(),
                ..Default::default()
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChainConfig {
    /// Empty means resolve from the chain's global table at startup.
    #[serde(default)]
    pub chain_name: String,
    #[serde(flatten)]
    pub endpoint: ChainEndpointConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayerConfig {
    pub tick_interval_ms: u64,
    pub max_batch_size: u64,
    /// Consecutive probe failures tolerated before rotating to a seed.
    pub failure_threshold: u32,
    pub system_contract: String,
    pub global_table: String,
    pub accept_header_action: String,
    pub vote_committee_action: String,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        RelayerConfig {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            system_contract: DEFAULT_SYSTEM_CONTRACT.to_string(),
            global_table: DEFAULT_GLOBAL_TABLE.to_string(),
            accept_header_action: DEFAULT_ACCEPT_HEADER_ACTION.to_string(),
            vote_committee_action: DEFAULT_VOTE_COMMITTEE_ACTION.to_string(),
        }
    }
}

impl RelayerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RPCClientConfig {
    pub timeout_ms: u64,
    pub expire_in_seconds: u32,
}

impl Default for RPCClientConfig {
    fn default() -> Self {
        RPCClientConfig {
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            expire_in_seconds: DEFAULT_EXPIRE_IN_SECONDS,
        }
    }
}

impl RPCClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Local chain node liveness check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeProbeConfig {
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub main_chain: MainChainConfig,
    #[serde(default)]
    pub sub_chains: Vec<SubChainConfig>,
    #[serde(default)]
    pub relayer: RelayerConfig,
    #[serde(default)]
    pub rpc_client: RPCClientConfig,
    #[serde(default)]
    pub node_probe: Option<NodeProbeConfig>,
}

impl Config {
    /// Reject values that would stall or crash the relayer at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.relayer.tick_interval_ms == 0 {
            bail!("relayer.tick_interval_ms must be greater than 0");
        }
        if self.relayer.max_batch_size == 0 {
            bail!("relayer.max_batch_size must be greater than 0");
        }
        if self.rpc_client.timeout_ms == 0 {
            bail!("rpc_client.timeout_ms must be greater than 0");
        }
        if self.main_chain.endpoint.url.is_empty() {
            bail!("main_chain.url is empty");
        }
        for (i, sub_chain) in self.sub_chains.iter().enumerate() {
            if sub_chain.endpoint.url.is_empty() {
                bail!("sub_chains[{}].url is empty", i);
            }
        }
        Ok(())
    }
}
