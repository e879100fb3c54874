//! Error types for shardfuzz-driver.

use std::time::Duration;

use thiserror::Error;

use shardfuzz_topology::{ConfigError, ServerId};

use crate::client::ClientError;

/// Result type for driver operations.
pub type Result<T> = std::result::Result<T, DriverError>;

/// Errors that abort a reconfiguration run.
///
/// None of these are recovered locally - every one propagates to the top
/// level and terminates the run, so the first divergence is surfaced
/// rather than papered over.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Invalid generator configuration (detected before any phase runs).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The configuration submission failed.
    #[error("configuration submission failed: {0}")]
    Submission(#[source] ClientError),

    /// The readiness query itself failed.
    #[error("readiness query failed: {0}")]
    Readiness(#[source] ClientError),

    /// The cluster did not report convergence within the bound.
    #[error("cluster did not converge within {timeout:?}")]
    ConvergenceTimeout { timeout: Duration },

    /// A converged shard's primary differs from the requested one.
    #[error("shard {shard}: expected primary [{expected}], observed {actual:?}")]
    InvariantViolation {
        /// Index of the offending shard.
        shard: usize,
        /// The primary the submitted topology requested.
        expected: ServerId,
        /// The primary replica set the cluster actually reported.
        actual: Vec<ServerId>,
    },
}
