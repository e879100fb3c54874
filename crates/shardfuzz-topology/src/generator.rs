//! Deterministic rotation generator for shard topologies.

use thiserror::Error;

use crate::{ServerId, ShardSpec, Topology};

/// Invalid generator configuration.
///
/// All of these are detected once, at construction, before any phase runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The server set is empty.
    #[error("server set is empty")]
    NoServers,

    /// A table needs at least one shard.
    #[error("shard count must be at least 1")]
    NoShards,

    /// Every shard needs at least one replica.
    #[error("replica count must be at least 1")]
    NoReplicas,

    /// More replicas requested per shard than servers exist.
    #[error("replica count {requested} exceeds server count {available}")]
    ReplicasExceedServers { requested: usize, available: usize },
}

/// Generates one topology per phase by rotating primaries across the
/// server set.
///
/// Construction validates the configuration; [`generate`](Self::generate)
/// is then pure and infallible. Two generators built from identical inputs
/// produce identical topologies for every phase - there is no hidden state.
#[derive(Debug, Clone)]
pub struct TopologyGenerator {
    servers: Vec<ServerId>,
    num_shards: usize,
    num_replicas: usize,
}

impl TopologyGenerator {
    /// Validate the configuration and build a generator.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the server set is empty, a count is
    /// zero, or the replica count exceeds the server count.
    pub fn new(
        servers: Vec<ServerId>,
        num_shards: usize,
        num_replicas: usize,
    ) -> Result<Self, ConfigError> {
        if servers.is_empty() {
            return Err(ConfigError::NoServers);
        }
        if num_shards == 0 {
            return Err(ConfigError::NoShards);
        }
        if num_replicas == 0 {
            return Err(ConfigError::NoReplicas);
        }
        if num_replicas > servers.len() {
            return Err(ConfigError::ReplicasExceedServers {
                requested: num_replicas,
                available: servers.len(),
            });
        }

        Ok(Self {
            servers,
            num_shards,
            num_replicas,
        })
    }

    /// The ordered server set.
    pub fn servers(&self) -> &[ServerId] {
        &self.servers
    }

    /// Shards per generated topology.
    pub fn num_shards(&self) -> usize {
        self.num_shards
    }

    /// Replicas per shard.
    pub fn num_replicas(&self) -> usize {
        self.num_replicas
    }

    /// Phases after which the rotation repeats (the server count).
    pub fn period(&self) -> u64 {
        self.servers.len() as u64
    }

    /// Generate the topology for a phase.
    ///
    /// Shard `i` gets primary `servers[(i + phase) % n]` and replicas
    /// `servers[(i + j + phase) % n]` for `j in 0..num_replicas`, in that
    /// order. The primary is always `replicas[0]`. Duplicate replicas are
    /// possible when counts alias and are deliberately not filtered.
    pub fn generate(&self, phase: u64) -> Topology {
        let n = self.servers.len() as u64;
        let shards = (0..self.num_shards as u64)
            .map(|i| {
                let primary = self.server_at(i + phase, n);
                let replicas = (0..self.num_replicas as u64)
                    .map(|j| self.server_at(i + j + phase, n))
                    .collect();
                ShardSpec { primary, replicas }
            })
            .collect();
        Topology::new(shards)
    }

    fn server_at(&self, index: u64, n: u64) -> ServerId {
        self.servers[(index % n) as usize].clone()
    }
}
