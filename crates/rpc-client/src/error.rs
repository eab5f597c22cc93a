use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChainError>;

/// Errors of a single chain RPC call.
#[derive(Error, Debug)]
pub enum ChainError {
    /// Endpoint could not be reached.
    #[error("{url} unreachable, method: {method} error: {reason}")]
    NetworkUnreachable {
        url: String,
        method: String,
        reason: String,
    },
    /// Request exceeded the client timeout.
    #[error("{url} timeout, method: {method}")]
    Timeout { url: String, method: String },
    /// The node answered with an error response.
    #[error("{method} rejected, code: {code} reason: {reason}")]
    Rejected {
        method: String,
        code: i64,
        reason: String,
    },
    /// The node answered with something we can't decode.
    #[error("malformed {method} response: {reason}")]
    Malformed { method: String, reason: String },
    #[error("can't find contract {0}")]
    ContractNotFound(String),
    #[error("action {action} doesn't exist on contract {contract}")]
    ActionNotFound { contract: String, action: String },
    #[error("signing failed: {0}")]
    SigningFailed(String),
    #[error("push rejected: {reason}")]
    PushRejected { reason: String },
}

impl ChainError {
    /// Whether the error means the endpoint itself is not usable. Only these
    /// feed endpoint failover accounting.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            ChainError::NetworkUnreachable { .. } | ChainError::Timeout { .. }
        )
    }

    pub(crate) fn malformed(method: &str, reason: impl ToString) -> Self {
        ChainError::Malformed {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }
}
