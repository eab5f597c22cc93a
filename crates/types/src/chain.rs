use serde::{Deserialize, Serialize};

use crate::header::Extension;
use crate::number::{bool_lenient, u64_lenient};

/// `get_chain_info` result. Only the fields the relay node reads are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    #[serde(default)]
    pub chain_id: String,
    #[serde(deserialize_with = "u64_lenient")]
    pub head_block_num: u64,
    #[serde(default)]
    pub head_block_id: String,
    #[serde(default)]
    pub head_block_time: String,
    #[serde(default)]
    pub block_interval_ms: Option<u64>,
}

/// `get_block_info` result.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    #[serde(default, deserialize_with = "u64_lenient")]
    pub block_num: u64,
    #[serde(default)]
    pub id: String,
    #[serde(deserialize_with = "u64_lenient")]
    pub timevalue: u64,
    pub proposer: String,
    #[serde(default)]
    pub version: u32,
    pub previous: String,
    pub transaction_mroot: String,
    pub action_mroot: String,
    pub committee_mroot: String,
    #[serde(default)]
    pub header_extensions: Vec<Extension>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerDetail {
    pub owner: String,
    #[serde(default)]
    pub producer_key: String,
    #[serde(default)]
    pub bls_key: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub location: u64,
}

/// One row of `get_producers`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProducerRow {
    #[serde(default)]
    pub chain_name: String,
    /// A row without the flag is not counted as an active producer.
    #[serde(default, deserialize_with = "bool_lenient")]
    pub is_active: bool,
    pub prod_detail: ProducerDetail,
}

/// One row of `get_subchain_committee`, as recorded by the main chain.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeRow {
    pub owner: String,
    #[serde(default)]
    pub miner_pk: String,
    #[serde(default)]
    pub bls_pk: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub location: u64,
}

/// `get_table_records` request body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableQuery {
    pub code: String,
    pub scope: String,
    pub table: String,
    pub json: bool,
    pub key_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
}

impl TableQuery {
    pub fn new(code: &str, scope: &str, table: &str) -> Self {
        TableQuery {
            code: code.to_owned(),
            scope: scope.to_owned(),
            table: table.to_owned(),
            json: true,
            key_type: "name",
            limit: None,
            table_key: None,
            lower_bound: None,
            upper_bound: None,
        }
    }

    pub fn limit(self, limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..self
        }
    }

    pub fn lower_bound(self, lower_bound: Option<String>) -> Self {
        Self {
            lower_bound,
            ..self
        }
    }
}

/// One page of `get_table_records`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePage {
    #[serde(default)]
    pub rows: Vec<serde_json::Value>,
    #[serde(default)]
    pub more: bool,
}
