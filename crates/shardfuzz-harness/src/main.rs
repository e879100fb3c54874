//! Shardfuzz binary
//!
//! Randomized correctness probe for shard reconfiguration: rotates
//! pseudo-random shard layouts through a table and asserts the cluster
//! converges to exactly what was requested, phase after phase.

use std::time::Instant;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shardfuzz_driver::{Driver, DriverConfig};
use shardfuzz_harness::SimCluster;
use shardfuzz_topology::TopologyGenerator;

const DB: &str = "test";
const TABLE: &str = "test";

#[derive(Parser, Debug)]
#[command(name = "shardfuzz")]
struct Args {
    /// Cluster size.
    #[arg(long, default_value_t = 1)]
    num_servers: usize,

    /// Rows to insert before the first phase.
    #[arg(long, default_value_t = 10)]
    num_rows: u64,

    /// Shards per topology.
    #[arg(long, default_value_t = 1)]
    num_shards: usize,

    /// Replicas per shard (must not exceed the server count).
    #[arg(long, default_value_t = 1)]
    num_replicas: usize,

    /// Reconfiguration phases to run.
    #[arg(long, default_value_t = 1)]
    num_phases: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shardfuzz=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let started = Instant::now();

    info!(servers = args.num_servers, "spinning up servers");
    let cluster = SimCluster::launch(args.num_servers)?;
    cluster.check()?;

    // Replica/server relationship is validated here, before any phase.
    let generator = TopologyGenerator::new(
        cluster.servers().to_vec(),
        args.num_shards,
        args.num_replicas,
    )?;

    info!(elapsed = ?started.elapsed(), "setting up table");
    cluster.create_database(DB)?;
    cluster.create_table(DB, TABLE)?;
    let inserted = cluster.insert_rows(DB, TABLE, args.num_rows)?;
    assert_eq!(inserted, args.num_rows);

    let driver = Driver::new(cluster.table(DB, TABLE), generator, DriverConfig::default());

    for phase in 0..args.num_phases {
        info!(
            phase = phase + 1,
            elapsed = ?started.elapsed(),
            "beginning reconfiguration phase"
        );
        let topology = driver.generator().generate(phase);
        driver.run_phase(phase, &topology).await?;
    }

    info!(elapsed = ?started.elapsed(), "all phases verified, cleaning up");
    Ok(())
}
