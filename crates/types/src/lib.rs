//! Data model shared by the relay node: chain RPC records, relayed block
//! headers, committee membership and the opaque transaction envelopes pushed
//! through the chain client.

pub mod bytes;
pub mod chain;
pub mod committee;
pub mod header;
pub mod number;
pub mod transaction;

pub use bytes::JsonBytes;
pub use chain::{BlockInfo, ChainInfo, CommitteeRow, ProducerDetail, ProducerRow, TablePage, TableQuery};
pub use committee::{CommitteeChange, CommitteeDiff, CommitteeMember};
pub use header::{BlockHeader, Extension};
pub use transaction::{
    AcceptHeaderParams, Action, PermissionLevel, PushReceipt, SignedTransaction, Transaction,
    UnsignedTransaction, VoteCommitteeParams,
};
