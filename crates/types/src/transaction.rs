use serde::{Deserialize, Serialize};

use crate::{committee::CommitteeChange, header::BlockHeader, header::Extension, JsonBytes};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionLevel {
    pub actor: String,
    pub permission: String,
}

impl PermissionLevel {
    pub fn active(actor: &str) -> Self {
        PermissionLevel {
            actor: actor.to_owned(),
            permission: "active".to_owned(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub account: String,
    pub name: String,
    pub authorization: Vec<PermissionLevel>,
    pub data: JsonBytes,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
    pub transaction_extensions: Vec<Extension>,
}

/// A transaction built for one action invocation, bound to the chain it was
/// built against.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub chain_id: String,
    pub transaction: Transaction,
}

impl UnsignedTransaction {
    pub fn into_signed(self, signature: String) -> SignedTransaction {
        SignedTransaction {
            transaction: self.transaction,
            signatures: vec![signature],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<String>,
}

/// Result of a successful push.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PushReceipt {
    pub transaction_id: String,
    #[serde(default)]
    pub processed: serde_json::Value,
}

/// Arguments of the main chain's accept-header action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptHeaderParams {
    pub chain_name: String,
    pub headers: Vec<BlockHeader>,
}

/// Arguments of a sub-chain's vote-committee action. The action accepts a
/// list but the chain only honours one change per vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteCommitteeParams {
    pub proposer: String,
    #[serde(rename = "proposeminer")]
    pub changes: Vec<CommitteeChange>,
}
