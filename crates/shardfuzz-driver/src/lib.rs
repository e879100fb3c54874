//! Shardfuzz Reconfiguration Driver
//!
//! Drives one submit-await-verify cycle ("phase") at a time against a
//! distributed table and asserts that the converged state matches the
//! requested shard layout exactly.
//!
//! # Phase State Machine
//!
//! Each phase is linear, with no branching states:
//!
//! 1. **Submit**: send the desired topology. The only acceptable outcomes
//!    are *replaced* (a change was applied) and *unchanged* (the table
//!    already matched - the idempotence case).
//! 2. **Await convergence**: after a short tunable grace period, block
//!    until the cluster reports all replicas ready, bounded by a timeout.
//! 3. **Verify**: compare every shard's observed `primary_replicas`
//!    against the single requested primary, positionally.
//!
//! Every check is a hard stop. A failure in any phase aborts the whole
//! run - the invariant under test is precisely "did the previous
//! submission take full effect", so phases are not independent and
//! nothing is retried.

mod client;
mod driver;
mod error;

pub use client::{ApplyOutcome, ClientError, ReadinessReport, TableClient};
pub use driver::{Driver, DriverConfig, PhaseReport};
pub use error::{DriverError, Result};
