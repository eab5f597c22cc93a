use std::sync::Mutex;

use sr_rpc_client::PrivateKey;

use crate::{
    events::{EventSink, RelayEvent},
    tx_pipeline::Credentials,
};

pub use sr_rpc_client::chain_client::mock::MockChain;

pub fn credentials(account: &str) -> Credentials {
    Credentials {
        account: account.to_string(),
        key: PrivateKey::from_hex(&"01".repeat(32)).unwrap(),
    }
}

#[derive(Default)]
pub struct RecordingSink(Mutex<Vec<RelayEvent>>);

impl RecordingSink {
    pub fn events(&self) -> Vec<RelayEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: RelayEvent) {
        self.0.lock().unwrap().push(event);
    }
}
