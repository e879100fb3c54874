//! The submit-await-verify phase driver.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use shardfuzz_topology::{ObservedShardStatus, Topology, TopologyGenerator};

use crate::client::{ApplyOutcome, TableClient};
use crate::error::{DriverError, Result};

/// Reference convergence bound, matching the 600 time-unit scenario the
/// probe was written against.
pub const DEFAULT_CONVERGENCE_TIMEOUT: Duration = Duration::from_secs(600);

/// Default grace period between submission and the first readiness poll.
pub const DEFAULT_CONVERGENCE_GRACE: Duration = Duration::from_secs(1);

/// Configuration for a reconfiguration driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Bound on the readiness wait. Expiry is a hard failure for the
    /// phase - it is not retried.
    pub convergence_timeout: Duration,

    /// Delay inserted between submission and the start of polling.
    ///
    /// A readiness query issued immediately after an update can observe
    /// the stale pre-change status as "ready". This is a tunable grace
    /// period for that external reporting defect, not a semantic
    /// requirement - set it to zero against a fixed collaborator.
    pub convergence_grace: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            convergence_timeout: DEFAULT_CONVERGENCE_TIMEOUT,
            convergence_grace: DEFAULT_CONVERGENCE_GRACE,
        }
    }
}

impl DriverConfig {
    /// Set the convergence timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.convergence_timeout = timeout;
        self
    }

    /// Set the grace period before readiness polling starts.
    #[must_use]
    pub fn with_grace(mut self, grace: Duration) -> Self {
        self.convergence_grace = grace;
        self
    }
}

/// Outcome of one successfully verified phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    /// 0-based phase index.
    pub phase: u64,
    /// How the submission was accepted.
    pub outcome: ApplyOutcome,
    /// Wall time from submission to verified convergence.
    pub elapsed: Duration,
}

/// Drives reconfiguration phases strictly sequentially: each phase must
/// converge and verify before the next topology is applied.
#[derive(Debug)]
pub struct Driver<C> {
    client: C,
    generator: TopologyGenerator,
    config: DriverConfig,
}

impl<C: TableClient> Driver<C> {
    /// Create a driver over a validated generator and a table client.
    pub fn new(client: C, generator: TopologyGenerator, config: DriverConfig) -> Self {
        Self {
            client,
            generator,
            config,
        }
    }

    /// The generator this driver rotates through.
    pub fn generator(&self) -> &TopologyGenerator {
        &self.generator
    }

    /// Run `num_phases` phases, aborting on the first failure.
    pub async fn run(&self, num_phases: u64) -> Result<Vec<PhaseReport>> {
        let mut reports = Vec::with_capacity(num_phases as usize);
        for phase in 0..num_phases {
            let topology = self.generator.generate(phase);
            reports.push(self.run_phase(phase, &topology).await?);
        }
        Ok(reports)
    }

    /// Run one phase: submit, await convergence, verify.
    pub async fn run_phase(&self, phase: u64, topology: &Topology) -> Result<PhaseReport> {
        let started = Instant::now();

        debug!(phase, %topology, "submitting configuration");
        let outcome = self
            .client
            .apply_config(topology)
            .await
            .map_err(DriverError::Submission)?;
        match outcome {
            ApplyOutcome::Replaced => debug!(phase, "configuration replaced"),
            ApplyOutcome::Unchanged => debug!(phase, "configuration already matched"),
        }

        if !self.config.convergence_grace.is_zero() {
            tokio::time::sleep(self.config.convergence_grace).await;
        }

        let timeout = self.config.convergence_timeout;
        debug!(phase, ?timeout, "waiting for all replicas to become ready");
        let report = match tokio::time::timeout(
            timeout,
            self.client.wait_all_replicas_ready(timeout),
        )
        .await
        {
            Ok(Ok(report)) => report,
            Ok(Err(err)) => return Err(DriverError::Readiness(err)),
            Err(_) => return Err(DriverError::ConvergenceTimeout { timeout }),
        };
        if !report.ready {
            return Err(DriverError::ConvergenceTimeout { timeout });
        }

        verify_primaries(topology, &report.shards)?;

        let elapsed = started.elapsed();
        info!(phase, %outcome, ?elapsed, "phase verified");
        Ok(PhaseReport {
            phase,
            outcome,
            elapsed,
        })
    }
}

/// Check that every shard's observed primary set is exactly the single
/// requested primary, positionally.
fn verify_primaries(topology: &Topology, observed: &[ObservedShardStatus]) -> Result<()> {
    for (shard, spec) in topology.iter().enumerate() {
        let actual = observed
            .get(shard)
            .map(|status| status.primary_replicas.clone())
            .unwrap_or_default();
        if actual.as_slice() != std::slice::from_ref(&spec.primary) {
            return Err(DriverError::InvariantViolation {
                shard,
                expected: spec.primary.clone(),
                actual,
            });
        }
    }
    Ok(())
}
