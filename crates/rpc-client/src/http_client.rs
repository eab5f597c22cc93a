use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use sr_types::{
    number::u64_lenient, Action, BlockInfo, ChainInfo, CommitteeRow, JsonBytes, PermissionLevel,
    ProducerRow, PushReceipt, SignedTransaction, TablePage, TableQuery, Transaction,
    UnsignedTransaction,
};
use tracing::{field, instrument, Span};

use crate::{
    chain_client::ChainClient,
    error::{ChainError, Result},
    signer::{sign_transaction, PrivateKey},
    utils::{classify, rejection, tapos, CHAIN_API_PREFIX},
};

const PRODUCERS_LIMIT: u32 = 10_000;

#[derive(Deserialize)]
struct ProducersPage {
    #[serde(default)]
    rows: Vec<ProducerRow>,
}

#[derive(Deserialize)]
struct AbiResponse {
    #[serde(default)]
    abi: Option<AbiDef>,
}

#[derive(Deserialize)]
struct AbiDef {
    #[serde(default)]
    actions: Vec<AbiAction>,
}

#[derive(Deserialize)]
struct AbiAction {
    name: String,
}

#[derive(Deserialize)]
struct BinArgs {
    binargs: JsonBytes,
}

#[derive(Serialize)]
struct PushBody<'a> {
    signatures: &'a [String],
    compression: &'static str,
    packed_context_free_data: &'static str,
    transaction: &'a Transaction,
}

/// Chain client speaking the node's HTTP api.
#[derive(Clone)]
pub struct HttpChainClient {
    url: String,
    http: reqwest::Client,
    expire_in_seconds: u32,
}

impl HttpChainClient {
    pub fn new(url: impl Into<String>, http: reqwest::Client, expire_in_seconds: u32) -> Self {
        let url: String = url.into();
        HttpChainClient {
            url: url.trim_end_matches('/').to_string(),
            http,
            expire_in_seconds,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    #[instrument(target = "sr-rpc-client", skip_all, err, fields(url = %self.url, method, params = field::Empty))]
    async fn request<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let params = serde_json::to_string(body).map_err(|err| ChainError::malformed(method, err))?;
        if params.len() < 64 {
            Span::current().record("params", field::display(&params));
        }

        let url = format!("{}/{}/{}", self.url, CHAIN_API_PREFIX, method);
        let resp = self
            .http
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(params)
            .send()
            .await
            .map_err(|err| classify(&self.url, method, err))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|err| classify(&self.url, method, err))?;
        if !status.is_success() {
            let (code, reason) = rejection(status.as_u16(), &text);
            return Err(ChainError::Rejected {
                method: method.to_string(),
                code,
                reason,
            });
        }

        serde_json::from_str(&text).map_err(|err| {
            log::debug!("{} response: {}", method, text);
            ChainError::malformed(method, err)
        })
    }
}

#[async_trait]
impl ChainClient for HttpChainClient {
    async fn get_chain_info(&self) -> Result<ChainInfo> {
        self.request("get_chain_info", &json!({})).await
    }

    async fn get_block_info(&self, block_num: u64) -> Result<BlockInfo> {
        let body = json!({ "block_num_or_id": block_num.to_string() });
        self.request("get_block_info", &body).await
    }

    async fn get_producers(&self, chain_name: &str) -> Result<Vec<ProducerRow>> {
        let body = json!({
            "json": true,
            "lower_bound": "",
            "limit": PRODUCERS_LIMIT,
            "chain_name": chain_name,
        });
        let page: ProducersPage = self.request("get_producers", &body).await?;
        Ok(page.rows)
    }

    async fn get_subchain_block_num(&self, chain_name: &str) -> Result<u64> {
        const METHOD: &str = "get_subchain_block_num";
        let body = json!({ "chain_name": chain_name });
        let value: Value = self.request(METHOD, &body).await?;
        let value = match value {
            Value::Object(mut obj) => obj.remove("block_num").unwrap_or(Value::Null),
            other => other,
        };
        u64_lenient(value).map_err(|err| ChainError::malformed(METHOD, err))
    }

    async fn get_subchain_committee(&self, chain_name: &str) -> Result<Vec<CommitteeRow>> {
        let body = json!({ "chain_name": chain_name });
        self.request("get_subchain_committee", &body).await
    }

    async fn get_table_records(&self, query: &TableQuery) -> Result<TablePage> {
        self.request("get_table_records", query).await
    }

    #[instrument(skip_all, fields(contract = contract, action = action))]
    async fn build_action(
        &self,
        contract: &str,
        action: &str,
        params: &Value,
        authorizer: &str,
    ) -> Result<UnsignedTransaction> {
        let abi: AbiResponse = match self
            .request("get_abi", &json!({ "account_name": contract }))
            .await
        {
            Ok(abi) => abi,
            Err(ChainError::Rejected { reason, .. }) => {
                log::debug!("get abi of {}: {}", contract, reason);
                return Err(ChainError::ContractNotFound(contract.to_string()));
            }
            Err(err) => return Err(err),
        };
        let abi = abi
            .abi
            .ok_or_else(|| ChainError::ContractNotFound(contract.to_string()))?;
        if !abi.actions.iter().any(|a| a.name == action) {
            return Err(ChainError::ActionNotFound {
                contract: contract.to_string(),
                action: action.to_string(),
            });
        }

        let body = json!({ "code": contract, "action": action, "args": params });
        let BinArgs { binargs } = self.request("abi_json_to_bin", &body).await?;

        let info = self.get_chain_info().await?;
        let tapos = tapos(&info, self.expire_in_seconds)?;

        let transaction = Transaction {
            expiration: tapos.expiration,
            ref_block_num: tapos.ref_block_num,
            ref_block_prefix: tapos.ref_block_prefix,
            actions: vec![Action {
                account: contract.to_string(),
                name: action.to_string(),
                authorization: vec![PermissionLevel::active(authorizer)],
                data: binargs,
            }],
            ..Default::default()
        };
        Ok(UnsignedTransaction {
            chain_id: info.chain_id,
            transaction,
        })
    }

    fn sign(
        &self,
        unsigned: &UnsignedTransaction,
        key: &PrivateKey,
        chain_id: &str,
    ) -> Result<String> {
        sign_transaction(&unsigned.transaction, key, chain_id)
    }

    async fn push(&self, signed: &SignedTransaction) -> Result<PushReceipt> {
        let body = PushBody {
            signatures: &signed.signatures,
            compression: "none",
            packed_context_free_data: "",
            transaction: &signed.transaction,
        };
        match self.request("push_transaction", &body).await {
            Err(ChainError::Rejected { reason, .. }) => Err(ChainError::PushRejected { reason }),
            ret => ret,
        }
    }
}
