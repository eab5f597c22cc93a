use anyhow::Result;
use sr_config::Config;

use crate::{
    committee_sync::{ChainProducerSource, CommitteeSynchronizer},
    header_relayer::BlockHeaderRelayer,
    runner::BaseInitComponents,
};

/// What the next tick would do for one sub-chain.
#[derive(Debug, Default)]
pub struct ChainReport {
    pub chain_name: String,
    pub relay_window: Option<(u64, u64)>,
    pub additions: Vec<String>,
    pub removals: Vec<String>,
    pub errors: Vec<String>,
}

impl std::fmt::Display for ChainReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[{}]", self.chain_name)?;
        match self.relay_window {
            Some((from, to)) if to > from => {
                writeln!(f, "  relay: blocks {}..{} ({} headers)", from, to, to - from)?
            }
            Some(_) => writeln!(f, "  relay: up to date")?,
            None => {}
        }
        if self.additions.is_empty() && self.removals.is_empty() {
            writeln!(f, "  committee: in sync")?;
        } else {
            writeln!(
                f,
                "  committee: add {:?}, remove {:?}",
                self.additions, self.removals
            )?;
        }
        for err in self.errors.iter() {
            writeln!(f, "  error: {}", err)?;
        }
        Ok(())
    }
}

/// Dry run: read everything a tick reads, push nothing.
pub async fn check(config: &Config) -> Result<Vec<ChainReport>> {
    let base = BaseInitComponents::init(config).await?;
    check_with(config, &base).await
}

pub async fn check_with(config: &Config, base: &BaseInitComponents) -> Result<Vec<ChainReport>> {
    let relayer = BlockHeaderRelayer::new(&config.relayer);
    let synchronizer = CommitteeSynchronizer::new(&config.relayer);
    let main_client = base.connector.connect(base.main_chain.endpoints.active_url());

    let mut reports = Vec::with_capacity(base.sub_chains.len());
    for sub_chain in base.sub_chains.iter() {
        let sub_client = base.connector.connect(sub_chain.endpoints.active_url());
        let mut report = ChainReport {
            chain_name: sub_chain.chain_name.clone(),
            ..Default::default()
        };

        match relayer
            .pending_window(sub_client.as_ref(), main_client.as_ref(), &sub_chain.chain_name)
            .await
        {
            Ok(window) => report.relay_window = Some((window.start, window.end)),
            Err(err) => report.errors.push(format!("{:#}", anyhow::Error::from(err))),
        }

        let local = ChainProducerSource::new(sub_client.as_ref(), &base.main_chain.name);
        match synchronizer
            .diff(&local, main_client.as_ref(), &sub_chain.chain_name)
            .await
        {
            Ok(diff) => {
                report.additions = diff.additions.into_iter().map(|m| m.account).collect();
                report.removals = diff.removals.into_iter().map(|m| m.account).collect();
            }
            Err(err) => report.errors.push(format!("{:#}", anyhow::Error::from(err))),
        }

        reports.push(report);
    }
    Ok(reports)
}
