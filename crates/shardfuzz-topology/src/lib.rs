//! Shardfuzz Topology Model
//!
//! Pure data model for a distributed table's shard layout, plus the
//! deterministic rotation generator that drives reconfiguration phases.
//!
//! # Rotation Generator
//!
//! For a fixed ordered server set of size `n`, phase `p` assigns shard `i`
//! the primary `servers[(i + p) % n]` and the replica set
//! `servers[(i + j + p) % n]` for `j in 0..num_replicas`. Successive phases
//! therefore reassign every shard's primary, forcing the cluster to perform
//! real primary hand-offs instead of converging trivially.
//!
//! # Determinism
//!
//! The generator is a pure function of (phase, server set, shard count,
//! replica count). The reconfiguration driver relies on this: the expected
//! post-convergence primary for every shard is unambiguous.
//!
//! Preconditions are validated once at generator construction; `generate`
//! itself is infallible.

mod generator;
mod shard;
mod server;

pub use generator::{ConfigError, TopologyGenerator};
pub use server::ServerId;
pub use shard::{ObservedShardStatus, ShardSpec, Topology};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_surface_round_trip() {
        let servers = vec![ServerId::new("a"), ServerId::new("b")];
        let generator = TopologyGenerator::new(servers, 1, 1).unwrap();
        let topology = generator.generate(0);
        assert_eq!(topology.len(), 1);
        assert_eq!(topology[0].primary.name(), "a");
    }
}
