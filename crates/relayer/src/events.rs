use std::{error::Error, fmt};

/// How one relay or sync attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { tx_id: String },
    /// Nothing to submit.
    Noop,
    Failed { reason: String },
}

impl Outcome {
    /// Failure carrying the error and all of its sources.
    pub fn failed(err: &(dyn Error + 'static)) -> Self {
        let mut reason = err.to_string();
        let mut source = err.source();
        while let Some(err) = source {
            reason.push_str(": ");
            reason.push_str(&err.to_string());
            source = err.source();
        }
        Outcome::Failed { reason }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded { tx_id } => write!(f, "succeeded, tx {}", tx_id),
            Outcome::Noop => write!(f, "noop"),
            Outcome::Failed { reason } => write!(f, "failed, {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// Headers `[from, to)` of `chain_name` were (or were meant to be) relayed.
    RelayAttempted {
        chain_name: String,
        from: u64,
        to: u64,
        outcome: Outcome,
    },
    CommitteeSyncAttempted {
        chain_name: String,
        diff_size: usize,
        outcome: Outcome,
    },
    /// The diff holds more changes than one vote can carry. Needs an operator.
    TooManyCommitteeChanges {
        chain_name: String,
        additions: Vec<String>,
        removals: Vec<String>,
    },
    EndpointFailedOver {
        chain_name: String,
        old_url: String,
        new_url: String,
    },
    TickSkipped {
        reason: String,
    },
}

/// Receives structured events produced by the relayer.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: RelayEvent);
}

/// Renders events into the log stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: RelayEvent) {
        match event {
            RelayEvent::RelayAttempted {
                chain_name,
                from,
                to,
                outcome: outcome @ Outcome::Failed { .. },
            } => {
                tracing::error!(chain = %chain_name, from, to, %outcome, "relay attempted");
            }
            RelayEvent::RelayAttempted {
                chain_name,
                from,
                to,
                outcome,
            } => {
                tracing::info!(chain = %chain_name, from, to, %outcome, "relay attempted");
            }
            RelayEvent::CommitteeSyncAttempted {
                chain_name,
                diff_size,
                outcome: outcome @ Outcome::Failed { .. },
            } => {
                tracing::error!(chain = %chain_name, diff_size, %outcome, "committee sync attempted");
            }
            RelayEvent::CommitteeSyncAttempted {
                chain_name,
                diff_size,
                outcome,
            } => {
                tracing::info!(chain = %chain_name, diff_size, %outcome, "committee sync attempted");
            }
            RelayEvent::TooManyCommitteeChanges {
                chain_name,
                additions,
                removals,
            } => {
                tracing::error!(
                    chain = %chain_name,
                    ?additions,
                    ?removals,
                    "too many committee changes, vote manually or run init-committee"
                );
            }
            RelayEvent::EndpointFailedOver {
                chain_name,
                old_url,
                new_url,
            } => {
                tracing::warn!(chain = %chain_name, %old_url, %new_url, "endpoint failed over");
            }
            RelayEvent::TickSkipped { reason } => {
                tracing::warn!(%reason, "tick skipped");
            }
        }
    }
}
