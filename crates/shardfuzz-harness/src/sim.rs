//! In-process simulated cluster.
//!
//! Stands in for the external cluster lifecycle provider and data-store
//! client: named servers, databases, tables with a current shard
//! configuration, and a [`TableHandle`] implementing the driver's
//! [`TableClient`] seam. Configuration changes are applied synchronously,
//! so readiness reports are immediate and always reflect the post-change
//! state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use shardfuzz_driver::{ApplyOutcome, ClientError, ReadinessReport, TableClient};
use shardfuzz_topology::{ObservedShardStatus, ServerId, ShardSpec, Topology};

/// Errors from fixture setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixtureError {
    /// The naming convention covers 26 servers at most.
    #[error("cannot name {0} servers (maximum 26)")]
    TooManyServers(usize),

    /// A cluster needs at least one server.
    #[error("server count must be at least 1")]
    NoServers,

    /// The database or table already exists.
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// The database or table does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The cluster's shared state is no longer reachable.
    #[error("cluster state is unhealthy")]
    Unhealthy,
}

/// Name `count` servers `a`, `b`, `c`, ... in positional order.
pub fn server_names(count: usize) -> Result<Vec<ServerId>, FixtureError> {
    if count == 0 {
        return Err(FixtureError::NoServers);
    }
    if count > 26 {
        return Err(FixtureError::TooManyServers(count));
    }
    Ok(('a'..='z')
        .take(count)
        .map(|c| ServerId::new(c.to_string()))
        .collect())
}

#[derive(Debug)]
struct TableState {
    rows: u64,
    config: Topology,
}

#[derive(Debug, Default)]
struct DatabaseState {
    tables: HashMap<String, TableState>,
}

#[derive(Debug, Default)]
struct ClusterState {
    databases: HashMap<String, DatabaseState>,
}

/// A simulated multi-node cluster.
///
/// Cheap to clone; clones share state, mirroring multiple connections to
/// one cluster.
#[derive(Debug, Clone)]
pub struct SimCluster {
    servers: Arc<Vec<ServerId>>,
    state: Arc<Mutex<ClusterState>>,
}

impl SimCluster {
    /// Spin up a cluster of `count` named servers.
    pub fn launch(count: usize) -> Result<Self, FixtureError> {
        let servers = server_names(count)?;
        debug!(count, "simulated cluster up");
        Ok(Self {
            servers: Arc::new(servers),
            state: Arc::new(Mutex::new(ClusterState::default())),
        })
    }

    /// The fixed, ordered server set.
    pub fn servers(&self) -> &[ServerId] {
        &self.servers
    }

    /// Liveness check, performed once before use.
    ///
    /// There are no real processes to probe here; the observable health
    /// signal is that the shared cluster state is still reachable. A
    /// poisoned lock means a writer died mid-update.
    pub fn check(&self) -> Result<(), FixtureError> {
        self.state
            .lock()
            .map(|_| ())
            .map_err(|_| FixtureError::Unhealthy)
    }

    /// Create a database.
    pub fn create_database(&self, name: &str) -> Result<(), FixtureError> {
        let mut state = self.state.lock().unwrap();
        if state.databases.contains_key(name) {
            return Err(FixtureError::AlreadyExists(format!("database {name}")));
        }
        state.databases.insert(name.to_owned(), DatabaseState::default());
        Ok(())
    }

    /// Create a table with the default single-shard layout on the first
    /// server.
    pub fn create_table(&self, db: &str, table: &str) -> Result<(), FixtureError> {
        let first = self.servers[0].clone();
        let default_config = Topology::new(vec![ShardSpec {
            primary: first.clone(),
            replicas: vec![first],
        }]);

        let mut state = self.state.lock().unwrap();
        let database = state
            .databases
            .get_mut(db)
            .ok_or_else(|| FixtureError::NotFound(format!("database {db}")))?;
        if database.tables.contains_key(table) {
            return Err(FixtureError::AlreadyExists(format!("table {db}.{table}")));
        }
        database.tables.insert(
            table.to_owned(),
            TableState {
                rows: 0,
                config: default_config,
            },
        );
        Ok(())
    }

    /// Bulk-insert rows; returns the number inserted.
    pub fn insert_rows(&self, db: &str, table: &str, count: u64) -> Result<u64, FixtureError> {
        let mut state = self.state.lock().unwrap();
        let table_state = state
            .databases
            .get_mut(db)
            .and_then(|d| d.tables.get_mut(table))
            .ok_or_else(|| FixtureError::NotFound(format!("table {db}.{table}")))?;
        table_state.rows += count;
        Ok(count)
    }

    /// Total rows currently in a table.
    pub fn row_count(&self, db: &str, table: &str) -> Result<u64, FixtureError> {
        let state = self.state.lock().unwrap();
        state
            .databases
            .get(db)
            .and_then(|d| d.tables.get(table))
            .map(|t| t.rows)
            .ok_or_else(|| FixtureError::NotFound(format!("table {db}.{table}")))
    }

    /// Open a handle to one table's control surface.
    pub fn table(&self, db: &str, table: &str) -> TableHandle {
        TableHandle {
            cluster: self.clone(),
            db: db.to_owned(),
            table: table.to_owned(),
        }
    }
}

/// Connection handle to one table, implementing the driver's client seam.
#[derive(Debug, Clone)]
pub struct TableHandle {
    cluster: SimCluster,
    db: String,
    table: String,
}

impl TableHandle {
    fn not_found(&self) -> ClientError {
        ClientError::Unavailable(format!("table {}.{} not found", self.db, self.table))
    }
}

#[async_trait]
impl TableClient for TableHandle {
    async fn apply_config(&self, topology: &Topology) -> Result<ApplyOutcome, ClientError> {
        let mut state = self.cluster.state.lock().unwrap();
        let table_state = state
            .databases
            .get_mut(&self.db)
            .and_then(|d| d.tables.get_mut(&self.table))
            .ok_or_else(|| self.not_found())?;

        if table_state.config == *topology {
            return Ok(ApplyOutcome::Unchanged);
        }
        table_state.config = topology.clone();
        debug!(table = %self.table, %topology, "configuration applied");
        Ok(ApplyOutcome::Replaced)
    }

    async fn wait_all_replicas_ready(
        &self,
        _timeout: Duration,
    ) -> Result<ReadinessReport, ClientError> {
        let state = self.cluster.state.lock().unwrap();
        let table_state = state
            .databases
            .get(&self.db)
            .and_then(|d| d.tables.get(&self.table))
            .ok_or_else(|| self.not_found())?;

        // Configs apply synchronously here, so the post-change status is
        // always immediately ready.
        let shards = table_state
            .config
            .iter()
            .map(|shard| ObservedShardStatus {
                primary_replicas: vec![shard.primary.clone()],
            })
            .collect();
        Ok(ReadinessReport {
            ready: true,
            shards,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_shard_topology(primaries: &[&str]) -> Topology {
        Topology::new(
            primaries
                .iter()
                .map(|p| ShardSpec {
                    primary: ServerId::new(p),
                    replicas: vec![ServerId::new(p)],
                })
                .collect(),
        )
    }

    #[test]
    fn names_follow_the_alphabet() {
        let names = server_names(3).unwrap();
        assert_eq!(
            names,
            vec![ServerId::new("a"), ServerId::new("b"), ServerId::new("c")]
        );
        assert_eq!(server_names(0).unwrap_err(), FixtureError::NoServers);
        assert_eq!(
            server_names(27).unwrap_err(),
            FixtureError::TooManyServers(27)
        );
    }

    #[test]
    fn fixture_setup_sequence() {
        let cluster = SimCluster::launch(2).unwrap();
        cluster.check().unwrap();
        cluster.create_database("test").unwrap();
        cluster.create_table("test", "test").unwrap();
        assert_eq!(cluster.insert_rows("test", "test", 10).unwrap(), 10);
        assert_eq!(cluster.row_count("test", "test").unwrap(), 10);
    }

    #[test]
    fn check_fails_when_cluster_state_is_poisoned() {
        let cluster = SimCluster::launch(1).unwrap();
        cluster.check().unwrap();

        // A writer dying mid-update poisons the shared state.
        let writer = cluster.clone();
        let _ = std::thread::spawn(move || {
            let _guard = writer.state.lock().unwrap();
            panic!("writer died holding the lock");
        })
        .join();

        assert_eq!(cluster.check().unwrap_err(), FixtureError::Unhealthy);
    }

    #[test]
    fn duplicate_creation_is_rejected() {
        let cluster = SimCluster::launch(1).unwrap();
        cluster.create_database("test").unwrap();
        assert!(matches!(
            cluster.create_database("test"),
            Err(FixtureError::AlreadyExists(_))
        ));
        cluster.create_table("test", "t").unwrap();
        assert!(matches!(
            cluster.create_table("test", "t"),
            Err(FixtureError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn apply_reports_replaced_then_unchanged() {
        let cluster = SimCluster::launch(2).unwrap();
        cluster.create_database("test").unwrap();
        cluster.create_table("test", "test").unwrap();
        let handle = cluster.table("test", "test");

        let topology = two_shard_topology(&["b", "a"]);
        assert_eq!(
            handle.apply_config(&topology).await.unwrap(),
            ApplyOutcome::Replaced
        );
        assert_eq!(
            handle.apply_config(&topology).await.unwrap(),
            ApplyOutcome::Unchanged
        );
    }

    #[tokio::test]
    async fn readiness_reflects_latest_config() {
        let cluster = SimCluster::launch(2).unwrap();
        cluster.create_database("test").unwrap();
        cluster.create_table("test", "test").unwrap();
        let handle = cluster.table("test", "test");

        let topology = two_shard_topology(&["b", "a"]);
        handle.apply_config(&topology).await.unwrap();

        let report = handle
            .wait_all_replicas_ready(Duration::from_secs(1))
            .await
            .unwrap();
        assert!(report.ready);
        assert_eq!(report.shards.len(), 2);
        assert_eq!(report.shards[0].primary_replicas, vec![ServerId::new("b")]);
        assert_eq!(report.shards[1].primary_replicas, vec![ServerId::new("a")]);
    }

    #[tokio::test]
    async fn missing_table_is_unavailable() {
        let cluster = SimCluster::launch(1).unwrap();
        let handle = cluster.table("nope", "nope");
        let err = handle
            .apply_config(&two_shard_topology(&["a"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Unavailable(_)));
    }
}
