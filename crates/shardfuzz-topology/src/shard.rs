//! Shard layout types.

use std::fmt;
use std::ops::Index;

use crate::ServerId;

/// One shard's desired layout: a primary plus its ordered replica set.
///
/// The replica list always contains the primary as its first element;
/// duplicates are possible when the replica count and server count alias
/// and are accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShardSpec {
    /// The node that should serialize reads/writes for this shard.
    pub primary: ServerId,
    /// Ordered replication group (non-empty, includes the primary).
    pub replicas: Vec<ServerId>,
}

/// The complete desired shard layout for a table at a point in time.
///
/// Order is significant: shard `i` here is matched positionally against
/// shard `i` of the cluster's reported status.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Topology(Vec<ShardSpec>);

impl Topology {
    /// Build a topology from an ordered shard list.
    pub fn new(shards: Vec<ShardSpec>) -> Self {
        Self(shards)
    }

    /// Number of shards.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the topology has no shards.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the shard specs in shard-index order.
    pub fn iter(&self) -> std::slice::Iter<'_, ShardSpec> {
        self.0.iter()
    }

    /// The shard specs as a slice.
    pub fn shards(&self) -> &[ShardSpec] {
        &self.0
    }
}

impl Index<usize> for Topology {
    type Output = ShardSpec;

    fn index(&self, shard: usize) -> &ShardSpec {
        &self.0[shard]
    }
}

impl<'a> IntoIterator for &'a Topology {
    type Item = &'a ShardSpec;
    type IntoIter = std::slice::Iter<'a, ShardSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, shard) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}:{}", i, shard.primary)?;
        }
        Ok(())
    }
}

/// Cluster-reported state for one shard after convergence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObservedShardStatus {
    /// Node(s) currently acting as primary for the shard.
    ///
    /// A healthy converged shard reports exactly one.
    pub primary_replicas: Vec<ServerId>,
}
