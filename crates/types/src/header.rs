use serde::{Deserialize, Serialize};

use crate::{chain::BlockInfo, JsonBytes};

/// A typed extension entry, `[kind, hex data]` on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension(pub u16, pub JsonBytes);

/// Sub-chain block header as submitted to the main chain's accept-header
/// action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub timestamp: u64,
    pub proposer: String,
    pub version: u32,
    pub previous: String,
    #[serde(rename = "transaction_mroot")]
    pub transaction_root: String,
    #[serde(rename = "action_mroot")]
    pub action_root: String,
    #[serde(rename = "committee_mroot")]
    pub committee_root: String,
    #[serde(rename = "header_extensions")]
    pub extensions: Vec<Extension>,
}

impl From<BlockInfo> for BlockHeader {
    fn from(block: BlockInfo) -> Self {
        BlockHeader {
            timestamp: block.timevalue,
            proposer: block.proposer,
            version: block.version,
            previous: block.previous,
            transaction_root: block.transaction_mroot,
            action_root: block.action_mroot,
            committee_root: block.committee_mroot,
            extensions: block.header_extensions,
        }
    }
}
