pub mod committee_sync;
pub mod endpoint;
pub mod events;
pub mod header_relayer;
pub mod node_probe;
pub mod runner;
pub mod scheduler;
pub mod subcommand;
pub mod tx_pipeline;

#[cfg(test)]
pub(crate) mod testing;
