use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use sr_config::Config;
use sr_rpc_client::{ChainClient, ChainConnector, HttpConnector};
use tokio::sync::{broadcast, mpsc};

use crate::{
    committee_sync::CommitteeSynchronizer,
    endpoint::{ChainEndpointSet, EndpointFailoverManager},
    events::{EventSink, TracingEventSink},
    header_relayer::BlockHeaderRelayer,
    node_probe::{ChainNodeProbe, NodeProbe},
    scheduler::{MainChainTarget, RelayScheduler, RelaySchedulerArgs, SubChainTarget},
    tx_pipeline::Credentials,
};

/// Components shared by `run` and the one-shot subcommands.
pub struct BaseInitComponents {
    pub connector: Arc<dyn ChainConnector>,
    pub main_chain: MainChainTarget,
    pub sub_chains: Vec<SubChainTarget>,
}

impl BaseInitComponents {
    pub async fn init(config: &Config) -> Result<Self> {
        let connector = HttpConnector::new(
            config.rpc_client.timeout(),
            config.rpc_client.expire_in_seconds,
        )
        .with_context(|| "init http connector")?;
        Self::init_with_connector(config, Arc::new(connector)).await
    }

    pub async fn init_with_connector(
        config: &Config,
        connector: Arc<dyn ChainConnector>,
    ) -> Result<Self> {
        config.validate().with_context(|| "invalid config")?;
        let failure_threshold = config.relayer.failure_threshold;

        let main_config = &config.main_chain;
        let main_chain = MainChainTarget {
            name: main_config.name.clone(),
            endpoints: ChainEndpointSet::from_config(
                main_config.name.clone(),
                &main_config.endpoint,
                failure_threshold,
            ),
            credentials: Credentials::from_hex(
                &main_config.endpoint.committee_account,
                main_config.endpoint.committee_key.expose(),
            )
            .with_context(|| "main chain committee key")?,
        };

        let mut sub_chains = Vec::with_capacity(config.sub_chains.len());
        for sub_config in config.sub_chains.iter() {
            let chain_name = if sub_config.chain_name.is_empty() {
                let client = connector.connect(&sub_config.endpoint.url);
                resolve_chain_name(client.as_ref(), config)
                    .await
                    .with_context(|| {
                        format!("resolve chain name of {}", sub_config.endpoint.url)
                    })?
            } else {
                sub_config.chain_name.clone()
            };
            log::info!("sub chain {} at {}", chain_name, sub_config.endpoint.url);

            let credentials = Credentials::from_hex(
                &sub_config.endpoint.committee_account,
                sub_config.endpoint.committee_key.expose(),
            )
            .with_context(|| format!("sub chain {} committee key", chain_name))?;
            sub_chains.push(SubChainTarget {
                endpoints: ChainEndpointSet::from_config(
                    chain_name.clone(),
                    &sub_config.endpoint,
                    failure_threshold,
                ),
                chain_name,
                credentials,
            });
        }

        Ok(BaseInitComponents {
            connector,
            main_chain,
            sub_chains,
        })
    }

    pub fn sub_chain(&self, chain_name: &str) -> Result<&SubChainTarget> {
        self.sub_chains
            .iter()
            .find(|sub| sub.chain_name == chain_name)
            .ok_or_else(|| anyhow!("sub chain {} is not configured", chain_name))
    }
}

async fn resolve_chain_name(client: &dyn ChainClient, config: &Config) -> Result<String> {
    let name = client
        .query_chain_name(&config.relayer.system_contract, &config.relayer.global_table)
        .await?;
    name.ok_or_else(|| anyhow!("global table has no chain name"))
}

pub fn build_scheduler(
    config: &Config,
    base: BaseInitComponents,
    events: Arc<dyn EventSink>,
) -> RelayScheduler {
    let node_probe = config.node_probe.as_ref().map(|probe| {
        let client = base.connector.connect(&probe.url);
        Arc::new(ChainNodeProbe::new(client)) as Arc<dyn NodeProbe>
    });

    RelayScheduler::new(RelaySchedulerArgs {
        tick_interval: config.relayer.tick_interval(),
        main_chain: base.main_chain,
        sub_chains: base.sub_chains,
        failover: EndpointFailoverManager::new(base.connector, events.clone()),
        relayer: BlockHeaderRelayer::new(&config.relayer),
        synchronizer: CommitteeSynchronizer::new(&config.relayer),
        node_probe,
        events,
    })
}

pub async fn run(config: Config) -> Result<()> {
    if config.sub_chains.is_empty() {
        log::warn!("no sub chain configured, only endpoint probes will run");
    }

    let base = BaseInitComponents::init(&config).await?;
    let scheduler = build_scheduler(&config, base, Arc::new(TracingEventSink));

    // Graceful shutdown event. If all the shutdown_sends get dropped, then we can shutdown gracefully.
    let (shutdown_send, mut shutdown_recv) = mpsc::channel::<()>(1);
    // Broadcast shutdown event.
    let (shutdown_event, shutdown_event_recv) = broadcast::channel(1);

    let mut scheduler_task = tokio::spawn({
        let shutdown_send = shutdown_send.clone();
        async move {
            let _tx = shutdown_send;
            scheduler.run(shutdown_event_recv).await;
        }
    });

    tokio::select! {
        _ = sigint_or_sigterm() => {},
        _ = &mut scheduler_task => {},
    };

    log::info!("send shutdown event");
    if let Err(err) = shutdown_event.send(()) {
        log::error!("Failed to broadcast shutdown event: {:?}", err);
    }

    // Make sure all the senders are dropped.
    drop(shutdown_send);

    // Returns once the scheduler finished its in-flight tick and dropped its
    // sender.
    let _ = shutdown_recv.recv().await;
    log::info!("Exiting...");

    Ok(())
}

async fn sigint_or_sigterm() {
    wait_for_signal().await;
    log::info!("received sigint or sigterm, shutting down");
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let int = tokio::signal::ctrl_c();
    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = int => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            log::warn!("can't listen to SIGTERM: {}", err);
            let _ = int.await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
