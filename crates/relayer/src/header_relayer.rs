use std::ops::Range;

use sr_config::RelayerConfig;
use sr_rpc_client::{ChainClient, ChainError};
use sr_types::{AcceptHeaderParams, BlockHeader, PushReceipt};
use thiserror::Error;
use tracing::instrument;

use crate::tx_pipeline::{self, Credentials, PipelineError};

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("query relay window")]
    Query(#[source] ChainError),
    #[error("fetch block {block_num} of batch {window:?}")]
    FetchFailed {
        window: Range<u64>,
        block_num: u64,
        #[source]
        source: ChainError,
    },
    #[error("push batch {window:?}")]
    Push {
        window: Range<u64>,
        #[source]
        source: PipelineError,
    },
}

impl RelayError {
    /// Batch the failed attempt was working on, if it got that far.
    pub fn window(&self) -> Option<Range<u64>> {
        match self {
            RelayError::Query(_) => None,
            RelayError::FetchFailed { window, .. } | RelayError::Push { window, .. } => {
                Some(window.clone())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayResult {
    /// Relayed block numbers, `from..to`. Empty when there was nothing to do.
    pub window: Range<u64>,
    pub receipt: Option<PushReceipt>,
}

impl RelayResult {
    pub fn relayed(&self) -> u64 {
        self.window.end - self.window.start
    }
}

/// Submits sub-chain headers to the main chain in contiguous batches.
///
/// The cursor lives on the main chain and is read on every call, so a
/// restarted relayer resumes where the main chain left off.
#[derive(Debug, Clone)]
pub struct BlockHeaderRelayer {
    max_batch_size: u64,
    contract: String,
    action: String,
}

impl BlockHeaderRelayer {
    pub fn new(config: &RelayerConfig) -> Self {
        BlockHeaderRelayer {
            max_batch_size: config.max_batch_size,
            contract: config.system_contract.clone(),
            action: config.accept_header_action.clone(),
        }
    }

    /// Blocks the next relay would submit. The sub-chain head itself is left
    /// for a later round.
    pub async fn pending_window(
        &self,
        sub_chain: &dyn ChainClient,
        main_chain: &dyn ChainClient,
        chain_name: &str,
    ) -> Result<Range<u64>, RelayError> {
        let sub_head = sub_chain
            .get_chain_info()
            .await
            .map_err(RelayError::Query)?
            .head_block_num;
        let last_relayed = main_chain
            .get_subchain_block_num(chain_name)
            .await
            .map_err(RelayError::Query)?;

        let next = last_relayed.saturating_add(1);
        let end = sub_head.min(next.saturating_add(self.max_batch_size));
        if end <= next {
            return Ok(next..next);
        }
        Ok(next..end)
    }

    #[instrument(skip_all, fields(chain = chain_name))]
    pub async fn relay_pending(
        &self,
        sub_chain: &dyn ChainClient,
        main_chain: &dyn ChainClient,
        chain_name: &str,
        credentials: &Credentials,
    ) -> Result<RelayResult, RelayError> {
        let window = self
            .pending_window(sub_chain, main_chain, chain_name)
            .await?;
        if window.is_empty() {
            return Ok(RelayResult {
                window,
                receipt: None,
            });
        }

        let mut headers = Vec::with_capacity((window.end - window.start) as usize);
        for block_num in window.clone() {
            let block = sub_chain.get_block_info(block_num).await.map_err(|source| {
                RelayError::FetchFailed {
                    window: window.clone(),
                    block_num,
                    source,
                }
            })?;
            headers.push(BlockHeader::from(block));
        }

        let params = AcceptHeaderParams {
            chain_name: chain_name.to_string(),
            headers,
        };
        let receipt =
            tx_pipeline::invoke(main_chain, &self.contract, &self.action, &params, credentials)
                .await
                .map_err(|source| RelayError::Push {
                    window: window.clone(),
                    source,
                })?;

        log::info!(
            "[{}] relayed headers {}..{}, tx {}",
            chain_name,
            window.start,
            window.end,
            receipt.transaction_id
        );
        Ok(RelayResult {
            window,
            receipt: Some(receipt),
        })
    }
}
