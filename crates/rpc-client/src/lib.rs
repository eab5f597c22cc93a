pub mod chain_client;
pub mod connector;
pub mod error;
pub mod http_client;
pub mod signer;
mod utils;

pub use chain_client::ChainClient;
pub use connector::{ChainConnector, HttpConnector};
pub use error::{ChainError, Result};
pub use http_client::HttpChainClient;
pub use signer::PrivateKey;
