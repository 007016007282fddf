//! Example: a full simulation run with a toy decay model.
//!
//! Cluster, run, and storage settings come from the `configuration/` directory (with
//! `APP_`-prefixed environment overrides); the harvest series itself is taken from the
//! command line.

use std::error::Error;

use clap::Parser;
use hwpc::cluster::ClusterHandle;
use hwpc::simulation::{RunReport, SimulationRun};
use hwpc::storage::{FsObjectStore, MemoryObjectStore, ObjectStore};
use hwpc::types::HarvestSeries;
use hwpc_config::Environment;
use hwpc_config::load_config;
use hwpc_config::shared::{ClusterConfig, RunConfig, StorageConfig};
use hwpc_telemetry::init_tracing;
use serde::Deserialize;
use tracing::info;

mod model;

use model::DecayModel;

/// Settings loaded from `configuration/base.yaml` plus the environment overlay.
#[derive(Debug, Deserialize)]
struct ExampleConfig {
    cluster: ClusterConfig,
    run: RunConfig,
    storage: StorageConfig,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// First harvest year of the series.
    #[arg(long, default_value = "2000")]
    start_year: i32,

    /// Last harvest year of the series.
    #[arg(long, default_value = "2020")]
    end_year: i32,

    /// Harvested volume per year, in hundreds of cubic feet.
    #[arg(long, default_value = "1000.0")]
    volume: f64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Set development environment for pretty logging.
    Environment::Dev.set();
    init_tracing(Environment::Dev);

    main_impl().await
}

async fn main_impl() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config: ExampleConfig = load_config()?;
    config.cluster.validate()?;
    config.run.validate()?;

    info!(
        run_name = %config.run.run_name,
        workers = config.cluster.workers,
        "starting example simulation run"
    );

    let years: Vec<i32> = (args.start_year..=args.end_year).collect();
    let volumes = vec![args.volume; years.len()];
    let harvest = HarvestSeries::new(years, volumes)?;

    let cluster = ClusterHandle::start(&config.cluster)?;
    let model = DecayModel::new(args.end_year);

    let report = match &config.storage {
        StorageConfig::Memory => {
            let store = MemoryObjectStore::new();
            run_simulation(&config.run, model, store, cluster.clone(), harvest).await?
        }
        StorageConfig::Fs { root } => {
            let store = FsObjectStore::new(root);
            run_simulation(&config.run, model, store, cluster.clone(), harvest).await?
        }
    };

    cluster.shutdown();

    info!(
        archives = report.archives.len(),
        tasks_completed = report.tasks_completed,
        elapsed = ?report.elapsed,
        "example run complete"
    );

    Ok(())
}

async fn run_simulation<S>(
    run_config: &RunConfig,
    model: DecayModel,
    store: S,
    cluster: ClusterHandle,
    harvest: HarvestSeries,
) -> Result<RunReport, Box<dyn Error>>
where
    S: ObjectStore + Clone + Send + Sync + 'static,
{
    let run = SimulationRun::new(1, run_config.clone(), model, store, cluster, harvest);

    Ok(run.run().await?)
}
