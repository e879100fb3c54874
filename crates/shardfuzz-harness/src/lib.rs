//! Shardfuzz Harness
//!
//! Fixture layer for the probe: a simulated multi-node cluster with
//! database/table setup, plus the server-naming convention the probe
//! uses (`a`, `b`, `c`, ...).
//!
//! The simulation applies every submitted configuration faithfully. It
//! exists so the probe's full path - spin up servers, create a table,
//! insert rows, rotate topologies, verify convergence - can run
//! end-to-end in-process; it is not a fault injector.

pub mod sim;

pub use sim::{server_names, FixtureError, SimCluster, TableHandle};
