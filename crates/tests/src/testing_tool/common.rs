use std::sync::{Arc, Mutex};

use sr_config::{ChainEndpointConfig, Config, PrivateKeyHex, SubChainConfig};
use sr_relayer::{
    events::{EventSink, Outcome, RelayEvent},
    runner::{build_scheduler, BaseInitComponents},
    scheduler::RelayScheduler,
};

use super::chain::ScriptedConnector;

pub const MAIN_URL: &str = "http://main-1:8888";
pub const MAIN_SEED_URLS: [&str; 2] = ["http://main-2:8888", "http://main-3:8888"];
pub const SUB_URL: &str = "http://sub-1:8899";
pub const SUB_CHAIN: &str = "11";
pub const MAIN_ACCOUNT: &str = "relayer.main";
pub const SUB_ACCOUNT: &str = "relayer.sub";

fn endpoint(url: &str, seed_urls: &[&str], account: &str) -> ChainEndpointConfig {
    ChainEndpointConfig {
        url: url.to_string(),
        seed_urls: seed_urls.iter().map(|url| url.to_string()).collect(),
        committee_account: account.to_string(),
        committee_key: PrivateKeyHex::new("01".repeat(32)),
    }
}

/// One main chain with two seeds and one sub-chain named `SUB_CHAIN`.
pub fn relay_config() -> Config {
    let mut config = Config::default();
    config.main_chain.endpoint = endpoint(MAIN_URL, &MAIN_SEED_URLS, MAIN_ACCOUNT);
    config.sub_chains = vec![SubChainConfig {
        chain_name: SUB_CHAIN.to_string(),
        endpoint: endpoint(SUB_URL, &[], SUB_ACCOUNT),
    }];
    config
}

pub async fn base_components(config: &Config, connector: Arc<ScriptedConnector>) -> BaseInitComponents {
    BaseInitComponents::init_with_connector(config, connector)
        .await
        .unwrap()
}

pub async fn setup_scheduler(
    config: &Config,
    connector: Arc<ScriptedConnector>,
    sink: Arc<RecordingSink>,
) -> RelayScheduler {
    let base = base_components(config, connector).await;
    build_scheduler(config, base, sink)
}

#[derive(Default)]
pub struct RecordingSink(Mutex<Vec<RelayEvent>>);

impl RecordingSink {
    pub fn events(&self) -> Vec<RelayEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Outcomes of relay attempts, with their windows.
    pub fn relay_outcomes(&self) -> Vec<(u64, u64, Outcome)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::RelayAttempted {
                    from, to, outcome, ..
                } => Some((from, to, outcome)),
                _ => None,
            })
            .collect()
    }

    pub fn sync_outcomes(&self) -> Vec<(usize, Outcome)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::CommitteeSyncAttempted {
                    diff_size, outcome, ..
                } => Some((diff_size, outcome)),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: RelayEvent) {
        self.0.lock().unwrap().push(event);
    }
}
