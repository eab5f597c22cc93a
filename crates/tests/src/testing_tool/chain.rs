use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};
use sr_rpc_client::{signer, ChainClient, ChainConnector, ChainError, PrivateKey, Result};
use sr_types::{
    AcceptHeaderParams, Action, BlockInfo, ChainInfo, CommitteeRow, JsonBytes, PermissionLevel,
    ProducerDetail, ProducerRow, PushReceipt, SignedTransaction, TablePage, TableQuery,
    Transaction, UnsignedTransaction, VoteCommitteeParams,
};

pub const SYSTEM_CONTRACT: &str = "system";
pub const ACCEPT_HEADER: &str = "acceptheader";
pub const VOTE_COMMITTEE: &str = "votecommittee";

/// Block id of `block_num`. Every scripted chain derives ids the same way so
/// the main chain can check that relayed headers link up.
pub fn block_id(block_num: u64) -> String {
    format!("{:064x}", block_num)
}

/// A transaction the chain accepted.
#[derive(Debug, Clone)]
pub struct PushedAction {
    pub contract: String,
    pub action: String,
    pub authorizer: String,
    pub params: Value,
}

impl PushedAction {
    pub fn accept_header(&self) -> Option<AcceptHeaderParams> {
        if self.action != ACCEPT_HEADER {
            return None;
        }
        serde_json::from_value(self.params.clone()).ok()
    }

    pub fn vote_committee(&self) -> Option<VoteCommitteeParams> {
        if self.action != VOTE_COMMITTEE {
            return None;
        }
        serde_json::from_value(self.params.clone()).ok()
    }
}

#[derive(Default)]
struct ChainState {
    alive: bool,
    head: u64,
    chain_name: Option<String>,
    failing_blocks: HashSet<u64>,
    reject_pushes: bool,
    producers: Vec<ProducerRow>,
    /// Main chain view of each sub-chain: last accepted block number.
    accepted: HashMap<String, u64>,
    /// Main chain view of each sub-chain: recorded committee.
    committees: HashMap<String, Vec<CommitteeRow>>,
    pushed: Vec<PushedAction>,
    info_calls: usize,
}

/// In-memory chain serving the `ChainClient` calls the relayer makes.
///
/// Accept-header pushes are validated like the main chain contract does:
/// the first header must link to the last accepted block, and the cursor
/// moves forward by the batch length.
pub struct ScriptedChain {
    url: String,
    chain_id: String,
    state: Mutex<ChainState>,
}

impl ScriptedChain {
    pub fn new(url: &str, head: u64) -> Self {
        ScriptedChain {
            url: url.to_string(),
            chain_id: "aa".repeat(32),
            state: Mutex::new(ChainState {
                alive: true,
                head,
                ..Default::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ChainState> {
        self.state.lock().unwrap()
    }

    pub fn set_alive(&self, alive: bool) {
        self.state().alive = alive;
    }

    pub fn set_head(&self, head: u64) {
        self.state().head = head;
    }

    pub fn set_chain_name(&self, chain_name: &str) {
        self.state().chain_name = Some(chain_name.to_string());
    }

    pub fn fail_block(&self, block_num: u64) {
        self.state().failing_blocks.insert(block_num);
    }

    pub fn heal_block(&self, block_num: u64) {
        self.state().failing_blocks.remove(&block_num);
    }

    pub fn reject_pushes(&self, reject: bool) {
        self.state().reject_pushes = reject;
    }

    /// Register a producer under `chain_name`.
    pub fn add_producer(&self, account: &str, chain_name: &str, is_active: bool) {
        self.state().producers.push(ProducerRow {
            chain_name: chain_name.to_string(),
            is_active,
            prod_detail: ProducerDetail {
                owner: account.to_string(),
                producer_key: format!("PUB_{}", account),
                bls_key: format!("BLS_{}", account),
                url: format!("https://{}", account),
                location: 0,
            },
        });
    }

    pub fn remove_producer(&self, account: &str) {
        self.state()
            .producers
            .retain(|row| row.prod_detail.owner != account);
    }

    pub fn set_accepted(&self, chain_name: &str, block_num: u64) {
        self.state()
            .accepted
            .insert(chain_name.to_string(), block_num);
    }

    pub fn accepted(&self, chain_name: &str) -> u64 {
        self.state().accepted.get(chain_name).copied().unwrap_or(0)
    }

    pub fn set_committee(&self, chain_name: &str, accounts: &[&str]) {
        let rows = accounts
            .iter()
            .map(|account| CommitteeRow {
                owner: account.to_string(),
                miner_pk: format!("PUB_{}", account),
                bls_pk: format!("BLS_{}", account),
                url: format!("https://{}", account),
                location: 0,
            })
            .collect();
        self.state().committees.insert(chain_name.to_string(), rows);
    }

    pub fn pushed(&self) -> Vec<PushedAction> {
        self.state().pushed.clone()
    }

    pub fn accepted_batches(&self) -> Vec<AcceptHeaderParams> {
        self.pushed()
            .iter()
            .filter_map(PushedAction::accept_header)
            .collect()
    }

    pub fn votes(&self) -> Vec<VoteCommitteeParams> {
        self.pushed()
            .iter()
            .filter_map(PushedAction::vote_committee)
            .collect()
    }

    pub fn info_calls(&self) -> usize {
        self.state().info_calls
    }

    fn check_alive(&self, method: &str) -> Result<()> {
        if self.state().alive {
            return Ok(());
        }
        Err(ChainError::NetworkUnreachable {
            url: self.url.clone(),
            method: method.to_string(),
            reason: "connection refused".to_string(),
        })
    }

    fn accept_headers(state: &mut ChainState, params: &Value) -> Result<()> {
        let params: AcceptHeaderParams = serde_json::from_value(params.clone())
            .map_err(|err| ChainError::PushRejected {
                reason: format!("bad accept header params: {}", err),
            })?;
        let accepted = state.accepted.entry(params.chain_name).or_insert(0);
        match params.headers.first() {
            Some(first) if first.previous == block_id(*accepted) => {
                *accepted += params.headers.len() as u64;
                Ok(())
            }
            Some(first) => Err(ChainError::PushRejected {
                reason: format!(
                    "header does not link, previous {} accepted {}",
                    first.previous, accepted
                ),
            }),
            None => Err(ChainError::PushRejected {
                reason: "empty header batch".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    async fn get_chain_info(&self) -> Result<ChainInfo> {
        self.check_alive("get_chain_info")?;
        let mut state = self.state();
        state.info_calls += 1;
        Ok(ChainInfo {
            chain_id: self.chain_id.clone(),
            head_block_num: state.head,
            head_block_id: block_id(state.head),
            head_block_time: "2018-10-10T10:00:00.000".to_string(),
            block_interval_ms: Some(500),
        })
    }

    async fn get_block_info(&self, block_num: u64) -> Result<BlockInfo> {
        self.check_alive("get_block_info")?;
        let state = self.state();
        if block_num > state.head || state.failing_blocks.contains(&block_num) {
            return Err(ChainError::Rejected {
                method: "get_block_info".to_string(),
                code: 3100002,
                reason: format!("Could not find block: {}", block_num),
            });
        }
        Ok(BlockInfo {
            block_num,
            id: block_id(block_num),
            timevalue: 1_540_000_000 + block_num,
            proposer: "user.111".to_string(),
            version: 0,
            previous: block_id(block_num.saturating_sub(1)),
            transaction_mroot: "00".repeat(32),
            action_mroot: "00".repeat(32),
            committee_mroot: "00".repeat(32),
            header_extensions: vec![],
        })
    }

    async fn get_producers(&self, _chain_name: &str) -> Result<Vec<ProducerRow>> {
        self.check_alive("get_producers")?;
        Ok(self.state().producers.clone())
    }

    async fn get_subchain_block_num(&self, chain_name: &str) -> Result<u64> {
        self.check_alive("get_subchain_block_num")?;
        Ok(self.accepted(chain_name))
    }

    async fn get_subchain_committee(&self, chain_name: &str) -> Result<Vec<CommitteeRow>> {
        self.check_alive("get_subchain_committee")?;
        Ok(self
            .state()
            .committees
            .get(chain_name)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_table_records(&self, query: &TableQuery) -> Result<TablePage> {
        self.check_alive("get_table_records")?;
        let rows = match (&self.state().chain_name, query.table.as_str()) {
            (Some(chain_name), "global") => vec![json!({ "chain_name": chain_name })],
            _ => vec![],
        };
        Ok(TablePage { rows, more: false })
    }

    async fn build_action(
        &self,
        contract: &str,
        action: &str,
        params: &Value,
        authorizer: &str,
    ) -> Result<UnsignedTransaction> {
        self.check_alive("build_action")?;
        if contract != SYSTEM_CONTRACT {
            return Err(ChainError::ContractNotFound(contract.to_string()));
        }
        if action != ACCEPT_HEADER && action != VOTE_COMMITTEE {
            return Err(ChainError::ActionNotFound {
                contract: contract.to_string(),
                action: action.to_string(),
            });
        }
        let data = serde_json::to_vec(params).map_err(|err| ChainError::Malformed {
            method: "abi_json_to_bin".to_string(),
            reason: err.to_string(),
        })?;

        let head = self.state().head;
        Ok(UnsignedTransaction {
            chain_id: self.chain_id.clone(),
            transaction: Transaction {
                expiration: "2018-10-10T10:01:00".to_string(),
                ref_block_num: (head & 0xffff) as u16,
                ref_block_prefix: 0,
                actions: vec![Action {
                    account: contract.to_string(),
                    name: action.to_string(),
                    authorization: vec![PermissionLevel::active(authorizer)],
                    data: JsonBytes::from_vec(data),
                }],
                ..Default::default()
            },
        })
    }

    fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        key: &PrivateKey,
        chain_id: &str,
    ) -> Result<String> {
        signer::sign_transaction(&unsigned.transaction, key, chain_id)
    }

    async fn push(&self, signed: &SignedTransaction) -> Result<PushReceipt> {
        self.check_alive("push_transaction")?;
        let mut state = self.state();
        if state.reject_pushes {
            return Err(ChainError::PushRejected {
                reason: "transaction declares authority but does not have signatures for it"
                    .to_string(),
            });
        }

        let action = signed
            .transaction
            .actions
            .first()
            .ok_or_else(|| ChainError::PushRejected {
                reason: "transaction has no action".to_string(),
            })?;
        let params: Value =
            serde_json::from_slice(action.data.as_bytes()).map_err(|err| {
                ChainError::PushRejected {
                    reason: format!("undecodable action data: {}", err),
                }
            })?;
        if action.name == ACCEPT_HEADER {
            Self::accept_headers(&mut state, &params)?;
        }

        state.pushed.push(PushedAction {
            contract: action.account.clone(),
            action: action.name.clone(),
            authorizer: action
                .authorization
                .first()
                .map(|level| level.actor.clone())
                .unwrap_or_default(),
            params,
        });
        Ok(PushReceipt {
            transaction_id: format!("{:064x}", state.pushed.len()),
            processed: Value::Null,
        })
    }
}

/// Serves each registered url with its scripted chain. Unknown urls get a
/// chain that is permanently down.
#[derive(Default)]
pub struct ScriptedConnector {
    chains: HashMap<String, Arc<ScriptedChain>>,
    connects: Mutex<Vec<String>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(mut self, chain: Arc<ScriptedChain>) -> Self {
        self.chains.insert(chain.url.clone(), chain);
        self
    }

    pub fn connects(&self) -> Vec<String> {
        self.connects.lock().unwrap().clone()
    }
}

impl ChainConnector for ScriptedConnector {
    fn connect(&self, url: &str) -> Arc<dyn ChainClient> {
        self.connects.lock().unwrap().push(url.to_string());
        match self.chains.get(url) {
            Some(chain) => chain.clone(),
            None => {
                let chain = ScriptedChain::new(url, 0);
                chain.set_alive(false);
                Arc::new(chain)
            }
        }
    }
}
