use anyhow::{Context, Result};
use sr_config::Config;
use sr_types::PushReceipt;

use crate::{
    committee_sync::{ChainProducerSource, CommitteeSynchronizer},
    runner::BaseInitComponents,
};

/// Vote the whole local producer set into an empty recorded committee.
pub async fn init_committee(config: &Config, chain_name: &str) -> Result<Vec<PushReceipt>> {
    let base = BaseInitComponents::init(config).await?;
    init_committee_with(config, &base, chain_name).await
}

pub async fn init_committee_with(
    config: &Config,
    base: &BaseInitComponents,
    chain_name: &str,
) -> Result<Vec<PushReceipt>> {
    let sub_chain = base.sub_chain(chain_name)?;
    let main_client = base.connector.connect(base.main_chain.endpoints.active_url());
    let sub_client = base.connector.connect(sub_chain.endpoints.active_url());

    let local = ChainProducerSource::new(sub_client.as_ref(), &base.main_chain.name);
    let receipts = CommitteeSynchronizer::new(&config.relayer)
        .bootstrap(
            &local,
            main_client.as_ref(),
            sub_client.as_ref(),
            chain_name,
            &sub_chain.credentials,
        )
        .await
        .with_context(|| format!("init committee of {}", chain_name))?;

    log::info!(
        "[{}] committee initialized with {} votes",
        chain_name,
        receipts.len()
    );
    Ok(receipts)
}
