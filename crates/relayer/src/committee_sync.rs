use async_trait::async_trait;
use sr_config::RelayerConfig;
use sr_rpc_client::{ChainClient, ChainError};
use sr_types::{CommitteeChange, CommitteeDiff, CommitteeMember, PushReceipt, VoteCommitteeParams};
use thiserror::Error;
use tracing::instrument;

use crate::tx_pipeline::{self, Credentials, PipelineError};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("query committee")]
    Query(#[source] ChainError),
    #[error(
        "{} committee changes (additions {additions:?}, removals {removals:?}), a vote carries one",
        .additions.len() + .removals.len()
    )]
    TooManyCommitteeChanges {
        additions: Vec<String>,
        removals: Vec<String>,
    },
    #[error("recorded committee has {recorded} members, bootstrap needs it empty")]
    CommitteeNotEmpty { recorded: usize },
    #[error("vote committee")]
    Push {
        /// Size of the diff the failed vote belonged to.
        diff_size: usize,
        #[source]
        source: PipelineError,
    },
}

impl SyncError {
    /// Number of committee changes the failed round was looking at. Zero when
    /// it failed before a diff was computed.
    pub fn diff_size(&self) -> usize {
        match self {
            SyncError::Query(_) | SyncError::CommitteeNotEmpty { .. } => 0,
            SyncError::TooManyCommitteeChanges {
                additions,
                removals,
            } => additions.len() + removals.len(),
            SyncError::Push { diff_size, .. } => *diff_size,
        }
    }
}

/// The local chain's authoritative producer set.
#[async_trait]
pub trait ProducerSource: Send + Sync {
    async fn list_active_producers(&self) -> Result<Vec<CommitteeMember>, ChainError>;
}

/// Producers registered on a chain, restricted to active ones scoped to
/// `scope`.
pub struct ChainProducerSource<'a> {
    client: &'a dyn ChainClient,
    scope: &'a str,
}

impl<'a> ChainProducerSource<'a> {
    pub fn new(client: &'a dyn ChainClient, scope: &'a str) -> Self {
        ChainProducerSource { client, scope }
    }
}

#[async_trait]
impl<'a> ProducerSource for ChainProducerSource<'a> {
    async fn list_active_producers(&self) -> Result<Vec<CommitteeMember>, ChainError> {
        let rows = self.client.get_producers(self.scope).await?;
        Ok(rows
            .into_iter()
            .filter(|row| row.is_active && row.chain_name == self.scope)
            .map(CommitteeMember::from)
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncResult {
    pub diff: CommitteeDiff,
    pub receipt: Option<PushReceipt>,
}

impl SyncResult {
    pub fn changed(&self) -> usize {
        self.diff.len()
    }
}

/// Keeps the committee recorded on the main chain in line with the local
/// producer set, one vote per round.
#[derive(Debug, Clone)]
pub struct CommitteeSynchronizer {
    contract: String,
    action: String,
}

impl CommitteeSynchronizer {
    pub fn new(config: &RelayerConfig) -> Self {
        CommitteeSynchronizer {
            contract: config.system_contract.clone(),
            action: config.vote_committee_action.clone(),
        }
    }

    /// Reads `(recorded, local)`. Both are read before anything is compared.
    async fn read_committees(
        &self,
        local: &dyn ProducerSource,
        main_chain: &dyn ChainClient,
        chain_name: &str,
    ) -> Result<(Vec<CommitteeMember>, Vec<CommitteeMember>), SyncError> {
        let local = local
            .list_active_producers()
            .await
            .map_err(SyncError::Query)?;
        let recorded = main_chain
            .get_subchain_committee(chain_name)
            .await
            .map_err(SyncError::Query)?
            .into_iter()
            .map(CommitteeMember::from)
            .collect();
        Ok((recorded, local))
    }

    pub async fn diff(
        &self,
        local: &dyn ProducerSource,
        main_chain: &dyn ChainClient,
        chain_name: &str,
    ) -> Result<CommitteeDiff, SyncError> {
        let (recorded, local) = self.read_committees(local, main_chain, chain_name).await?;
        Ok(CommitteeDiff::build(&recorded, &local))
    }

    async fn vote(
        &self,
        sub_chain: &dyn ChainClient,
        change: CommitteeChange,
        credentials: &Credentials,
    ) -> Result<PushReceipt, PipelineError> {
        let params = VoteCommitteeParams {
            proposer: credentials.account.clone(),
            changes: vec![change],
        };
        tx_pipeline::invoke(sub_chain, &self.contract, &self.action, &params, credentials).await
    }

    #[instrument(skip_all, fields(chain = chain_name))]
    pub async fn sync_once(
        &self,
        local: &dyn ProducerSource,
        main_chain: &dyn ChainClient,
        sub_chain: &dyn ChainClient,
        chain_name: &str,
        credentials: &Credentials,
    ) -> Result<SyncResult, SyncError> {
        let diff = self.diff(local, main_chain, chain_name).await?;
        if diff.is_empty() {
            return Ok(SyncResult {
                diff,
                receipt: None,
            });
        }

        let change = match diff.single_change() {
            Some(change) => change,
            None => {
                return Err(SyncError::TooManyCommitteeChanges {
                    additions: accounts(&diff.additions),
                    removals: accounts(&diff.removals),
                })
            }
        };

        log::info!(
            "[{}] vote {} {}",
            chain_name,
            if change.is_addition { "add" } else { "remove" },
            change.member.account
        );
        let receipt = self
            .vote(sub_chain, change, credentials)
            .await
            .map_err(|source| SyncError::Push {
                diff_size: diff.len(),
                source,
            })?;
        Ok(SyncResult {
            diff,
            receipt: Some(receipt),
        })
    }

    /// Seed an empty recorded committee with every local producer, one vote
    /// each, stopping at the first failed vote.
    #[instrument(skip_all, fields(chain = chain_name))]
    pub async fn bootstrap(
        &self,
        local: &dyn ProducerSource,
        main_chain: &dyn ChainClient,
        sub_chain: &dyn ChainClient,
        chain_name: &str,
        credentials: &Credentials,
    ) -> Result<Vec<PushReceipt>, SyncError> {
        let (recorded, local) = self.read_committees(local, main_chain, chain_name).await?;
        if !recorded.is_empty() {
            return Err(SyncError::CommitteeNotEmpty {
                recorded: recorded.len(),
            });
        }

        let diff = CommitteeDiff::build(&recorded, &local);
        let mut receipts = Vec::with_capacity(diff.len());
        for change in diff.changes() {
            let account = change.member.account.clone();
            match self.vote(sub_chain, change, credentials).await {
                Ok(receipt) => {
                    log::info!("[{}] voted in {}", chain_name, account);
                    receipts.push(receipt);
                }
                Err(err) => {
                    log::error!(
                        "[{}] vote {} failed after {} votes",
                        chain_name,
                        account,
                        receipts.len()
                    );
                    return Err(SyncError::Push {
                        diff_size: diff.len(),
                        source: err,
                    });
                }
            }
        }
        Ok(receipts)
    }
}

fn accounts(members: &[CommitteeMember]) -> Vec<String> {
    members.iter().map(|m| m.account.clone()).collect()
}
