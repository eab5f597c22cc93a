use std::{sync::Arc, time::Duration};

use tokio::{
    sync::broadcast,
    time::{interval, MissedTickBehavior},
};
use tracing::{info_span, Instrument};

use crate::{
    committee_sync::{ChainProducerSource, CommitteeSynchronizer, SyncError},
    endpoint::{ChainEndpointSet, EndpointFailoverManager},
    events::{EventSink, Outcome, RelayEvent},
    header_relayer::BlockHeaderRelayer,
    node_probe::NodeProbe,
    tx_pipeline::Credentials,
};

/// The main chain as seen by the relayer.
pub struct MainChainTarget {
    /// Scope of the local producers that form sub-chain committees.
    pub name: String,
    pub endpoints: ChainEndpointSet,
    pub credentials: Credentials,
}

pub struct SubChainTarget {
    pub chain_name: String,
    pub endpoints: ChainEndpointSet,
    pub credentials: Credentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickState {
    Idle,
    TickRunning,
}

pub struct RelaySchedulerArgs {
    pub tick_interval: Duration,
    pub main_chain: MainChainTarget,
    pub sub_chains: Vec<SubChainTarget>,
    pub failover: EndpointFailoverManager,
    pub relayer: BlockHeaderRelayer,
    pub synchronizer: CommitteeSynchronizer,
    pub node_probe: Option<Arc<dyn NodeProbe>>,
    pub events: Arc<dyn EventSink>,
}

/// Runs probe, relay and sync for every sub-chain once per tick. Ticks never
/// overlap and a failing step never stops the steps after it.
pub struct RelayScheduler {
    tick_interval: Duration,
    main_chain: MainChainTarget,
    sub_chains: Vec<SubChainTarget>,
    failover: EndpointFailoverManager,
    relayer: BlockHeaderRelayer,
    synchronizer: CommitteeSynchronizer,
    node_probe: Option<Arc<dyn NodeProbe>>,
    events: Arc<dyn EventSink>,
    state: TickState,
}

impl RelayScheduler {
    pub fn new(args: RelaySchedulerArgs) -> Self {
        let RelaySchedulerArgs {
            tick_interval,
            main_chain,
            sub_chains,
            failover,
            relayer,
            synchronizer,
            node_probe,
            events,
        } = args;

        RelayScheduler {
            tick_interval,
            main_chain,
            sub_chains,
            failover,
            relayer,
            synchronizer,
            node_probe,
            events,
            state: TickState::Idle,
        }
    }

    pub fn state(&self) -> TickState {
        self.state
    }

    pub fn main_chain(&self) -> &MainChainTarget {
        &self.main_chain
    }

    pub fn sub_chains(&self) -> &[SubChainTarget] {
        &self.sub_chains
    }

    /// Timer fired. Returns false if the fire was dropped because a tick is
    /// still running.
    pub async fn on_fire(&mut self) -> bool {
        if self.state == TickState::TickRunning {
            log::debug!("tick still running, drop timer fire");
            return false;
        }

        self.state = TickState::TickRunning;
        self.tick().await;
        self.state = TickState::Idle;
        true
    }

    async fn tick(&mut self) {
        let RelayScheduler {
            failover,
            relayer,
            synchronizer,
            node_probe,
            events,
            main_chain,
            sub_chains,
            ..
        } = self;

        failover.probe(&mut main_chain.endpoints).await;

        let alive = match node_probe {
            Some(probe) => probe.is_alive().await,
            None => true,
        };
        if !alive {
            events.emit(RelayEvent::TickSkipped {
                reason: "local node is not alive".to_string(),
            });
        }

        let main_client = failover.client(&main_chain.endpoints);
        for sub_chain in sub_chains.iter_mut() {
            failover.probe(&mut sub_chain.endpoints).await;
            if !alive {
                continue;
            }
            let sub_client = failover.client(&sub_chain.endpoints);
            let chain_name = sub_chain.chain_name.as_str();

            let relayed = relayer
                .relay_pending(
                    sub_client.as_ref(),
                    main_client.as_ref(),
                    chain_name,
                    &main_chain.credentials,
                )
                .await;
            let event = match relayed {
                Ok(result) => RelayEvent::RelayAttempted {
                    chain_name: chain_name.to_string(),
                    from: result.window.start,
                    to: result.window.end,
                    outcome: match result.receipt {
                        Some(receipt) => Outcome::Succeeded {
                            tx_id: receipt.transaction_id,
                        },
                        None => Outcome::Noop,
                    },
                },
                Err(err) => {
                    let window = err.window().unwrap_or(0..0);
                    RelayEvent::RelayAttempted {
                        chain_name: chain_name.to_string(),
                        from: window.start,
                        to: window.end,
                        outcome: Outcome::failed(&err),
                    }
                }
            };
            events.emit(event);

            let local = ChainProducerSource::new(sub_client.as_ref(), &main_chain.name);
            let synced = synchronizer
                .sync_once(
                    &local,
                    main_client.as_ref(),
                    sub_client.as_ref(),
                    chain_name,
                    &sub_chain.credentials,
                )
                .await;
            match synced {
                Ok(result) => events.emit(RelayEvent::CommitteeSyncAttempted {
                    chain_name: chain_name.to_string(),
                    diff_size: result.changed(),
                    outcome: match result.receipt {
                        Some(receipt) => Outcome::Succeeded {
                            tx_id: receipt.transaction_id,
                        },
                        None => Outcome::Noop,
                    },
                }),
                Err(err) => {
                    if let SyncError::TooManyCommitteeChanges {
                        additions,
                        removals,
                    } = &err
                    {
                        events.emit(RelayEvent::TooManyCommitteeChanges {
                            chain_name: chain_name.to_string(),
                            additions: additions.clone(),
                            removals: removals.clone(),
                        });
                    }
                    events.emit(RelayEvent::CommitteeSyncAttempted {
                        chain_name: chain_name.to_string(),
                        diff_size: err.diff_size(),
                        outcome: Outcome::failed(&err),
                    });
                }
            }
        }
    }

    /// Tick every `tick_interval` until shutdown. A tick in flight when
    /// shutdown arrives runs to completion first.
    pub async fn run(mut self, mut shutdown_event: broadcast::Receiver<()>) {
        let mut timer = interval(self.tick_interval);
        // A tick longer than the interval delays the next one.
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown_event.recv() => {
                    log::info!("relay scheduler exited successfully");
                    return;
                }
                _ = timer.tick() => {
                    let span = info_span!("relay_tick");
                    self.on_fire().instrument(span).await;
                }
            }
        }
    }
}
