//! Table client interface consumed by the driver.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use shardfuzz_topology::{ObservedShardStatus, Topology};

/// Errors a [`TableClient`] implementation can report.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The cluster rejected the configuration update outright.
    #[error("configuration update rejected: {0}")]
    Rejected(String),

    /// The control/query interface could not be reached.
    #[error("cluster unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of an accepted configuration submission.
///
/// The two acceptance outcomes are kept distinct rather than collapsed
/// into a single "accepted" flag: a no-op submission when a real change
/// was expected is worth seeing in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The table's configuration was changed to the requested layout.
    Replaced,
    /// The table already matched the requested layout.
    Unchanged,
}

impl fmt::Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replaced => f.write_str("replaced"),
            Self::Unchanged => f.write_str("unchanged"),
        }
    }
}

/// Snapshot returned by the readiness wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessReport {
    /// Whether all replicas for all shards reported ready in time.
    pub ready: bool,
    /// Post-change shard status, in shard-index order.
    pub shards: Vec<ObservedShardStatus>,
}

/// Narrow interface to the table's control/query surface.
///
/// This is the seam between the driver and the external data store: a
/// live cluster connection in production, an in-process simulation in
/// tests and the bundled harness.
#[async_trait]
pub trait TableClient: Send + Sync {
    /// Submit `topology` as the table's new desired configuration.
    async fn apply_config(&self, topology: &Topology) -> Result<ApplyOutcome, ClientError>;

    /// Block until all replicas for all shards are ready, bounded by
    /// `timeout`, and return the post-change status snapshot.
    ///
    /// Implementations should return `ready: false` rather than an error
    /// when the bound expires; the driver treats both the same way.
    async fn wait_all_replicas_ready(
        &self,
        timeout: Duration,
    ) -> Result<ReadinessReport, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_outcome_display() {
        assert_eq!(ApplyOutcome::Replaced.to_string(), "replaced");
        assert_eq!(ApplyOutcome::Unchanged.to_string(), "unchanged");
    }
}
