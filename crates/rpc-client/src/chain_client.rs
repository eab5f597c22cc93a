use async_trait::async_trait;
use serde_json::Value;
use sr_types::{
    BlockInfo, ChainInfo, CommitteeRow, ProducerRow, PushReceipt, SignedTransaction, TablePage,
    TableQuery, UnsignedTransaction,
};

use crate::{error::Result, signer::PrivateKey};

/// Query, build, sign and push against one chain endpoint.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn get_chain_info(&self) -> Result<ChainInfo>;

    async fn get_block_info(&self, block_num: u64) -> Result<BlockInfo>;

    /// Producers registered on this chain, active or not.
    async fn get_producers(&self, chain_name: &str) -> Result<Vec<ProducerRow>>;

    /// Last sub-chain block number the main chain has accepted.
    async fn get_subchain_block_num(&self, chain_name: &str) -> Result<u64>;

    /// Sub-chain committee as recorded on the main chain.
    async fn get_subchain_committee(&self, chain_name: &str) -> Result<Vec<CommitteeRow>>;

    async fn get_table_records(&self, query: &TableQuery) -> Result<TablePage>;

    /// Encode `params` for `contract::action` authorized by `authorizer@active`
    /// and wrap it into a transaction referencing the current head block.
    async fn build_action(
        &self,
        contract: &str,
        action: &str,
        params: &Value,
        authorizer: &str,
    ) -> Result<UnsignedTransaction>;

    fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        key: &PrivateKey,
        chain_id: &str,
    ) -> Result<String>;

    async fn push(&self, signed: &SignedTransaction) -> Result<PushReceipt>;

    /// Chain name stored in the system contract's global table.
    async fn query_chain_name(
        &self,
        system_contract: &str,
        global_table: &str,
    ) -> Result<Option<String>> {
        let query = TableQuery::new(system_contract, system_contract, global_table);
        let page = self.get_table_records(&query).await?;
        Ok(page
            .rows
            .first()
            .and_then(|row| row_key(row, "chain_name"))
            .filter(|name| !name.is_empty()))
    }
}

fn row_key(row: &Value, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

/// `MockChain`, a mockall double of `ChainClient` shared by the workspace
/// unit tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;

    mockall::mock! {
        pub Chain {}

        #[async_trait]
        impl ChainClient for Chain {
            async fn get_chain_info(&self) -> Result<ChainInfo>;
            async fn get_block_info(&self, block_num: u64) -> Result<BlockInfo>;
            async fn get_producers(&self, chain_name: &str) -> Result<Vec<ProducerRow>>;
            async fn get_subchain_block_num(&self, chain_name: &str) -> Result<u64>;
            async fn get_subchain_committee(&self, chain_name: &str) -> Result<Vec<CommitteeRow>>;
            async fn get_table_records(&self, query: &TableQuery) -> Result<TablePage>;
            async fn build_action(
                &self,
                contract: &str,
                action: &str,
                params: &Value,
                authorizer: &str,
            ) -> Result<UnsignedTransaction>;
            fn sign(
                &self,
                unsigned: &UnsignedTransaction,
                key: &PrivateKey,
                chain_id: &str,
            ) -> Result<String>;
            async fn push(&self, signed: &SignedTransaction) -> Result<PushReceipt>;
        }
    }
}
