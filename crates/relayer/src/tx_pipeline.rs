use serde::Serialize;
use sr_rpc_client::{ChainClient, ChainError, PrivateKey};
use sr_types::PushReceipt;
use thiserror::Error;
use tracing::instrument;

/// Account authorizing transactions on one chain.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub account: String,
    pub key: PrivateKey,
}

impl Credentials {
    pub fn from_hex(account: &str, key_hex: &str) -> Result<Self, ChainError> {
        Ok(Credentials {
            account: account.to_string(),
            key: PrivateKey::from_hex(key_hex)?,
        })
    }
}

/// Stage at which a transaction invocation failed.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("build {action}")]
    Build {
        action: String,
        #[source]
        source: ChainError,
    },
    #[error("sign {action}")]
    Sign {
        action: String,
        #[source]
        source: ChainError,
    },
    #[error("push {action}")]
    Push {
        action: String,
        #[source]
        source: ChainError,
    },
}

impl PipelineError {
    pub fn chain_error(&self) -> &ChainError {
        match self {
            PipelineError::Build { source, .. }
            | PipelineError::Sign { source, .. }
            | PipelineError::Push { source, .. } => source,
        }
    }
}

/// Build, sign and push one action invocation. Nothing is retried, a failed
/// stage ends the call.
#[instrument(skip_all, fields(contract = contract, action = action, authorizer = %credentials.account))]
pub async fn invoke<P: Serialize + Sync + ?Sized>(
    client: &dyn ChainClient,
    contract: &str,
    action: &str,
    params: &P,
    credentials: &Credentials,
) -> Result<PushReceipt, PipelineError> {
    let params = serde_json::to_value(params).map_err(|err| PipelineError::Build {
        action: action.to_string(),
        source: ChainError::Malformed {
            method: action.to_string(),
            reason: err.to_string(),
        },
    })?;
    let unsigned = client
        .build_action(contract, action, &params, &credentials.account)
        .await
        .map_err(|source| PipelineError::Build {
            action: action.to_string(),
            source,
        })?;

    let signature = client
        .sign(&unsigned, &credentials.key, &unsigned.chain_id)
        .map_err(|source| PipelineError::Sign {
            action: action.to_string(),
            source,
        })?;

    let signed = unsigned.into_signed(signature);
    let receipt = client
        .push(&signed)
        .await
        .map_err(|source| PipelineError::Push {
            action: action.to_string(),
            source,
        })?;

    log::debug!("{} pushed, tx {}", action, receipt.transaction_id);
    Ok(receipt)
}
