use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::aggregate::ResultAggregator;
use crate::cluster::ClusterHandle;
use crate::error::{ErrorKind, HwpcResult};
use crate::hwpc_error;
use crate::model::{SimulationModel, TaskResolution};
use crate::report::{ReportPrefix, build_bundle};
use crate::storage::ObjectStore;
use crate::types::HarvestSeries;
use hwpc_config::shared::RunConfig;

pub type RunId = u64;

/// Summary of a completed run.
#[derive(Debug)]
pub struct RunReport {
    /// Storage keys of the uploaded archives, in upload order.
    pub archives: Vec<String>,
    /// Number of simulation tasks that resolved, including spawned children.
    pub tasks_completed: usize,
    /// Wall-clock duration of the whole run.
    pub elapsed: Duration,
}

/// One end-to-end simulation run: schedule, accumulate, report, upload.
///
/// The run seeds the task graph from the model's initial tasks and drains it through the
/// cluster, absorbing each partial result as it completes and scheduling any children the
/// resolution discovered. The task graph is dynamic, so the set of outstanding tasks can
/// grow while the run is already waiting on it. Any task failure aborts the whole run:
/// outstanding tasks are cancelled, the cluster is shut down, and accumulated state is
/// discarded without uploading anything. A successful run leaves the cluster untouched,
/// so the handle's owner can drive further runs over the same pool.
#[derive(Debug)]
pub struct SimulationRun<M, S> {
    id: RunId,
    config: Arc<RunConfig>,
    model: Arc<M>,
    store: S,
    cluster: ClusterHandle,
    harvest: HarvestSeries,
}

impl<M, S> SimulationRun<M, S>
where
    M: SimulationModel + Send + Sync + 'static,
    S: ObjectStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        id: RunId,
        config: RunConfig,
        model: M,
        store: S,
        cluster: ClusterHandle,
        harvest: HarvestSeries,
    ) -> Self {
        Self {
            id,
            config: Arc::new(config),
            model: Arc::new(model),
            store,
            cluster,
            harvest,
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    /// Drives the run to completion and uploads one archive per finalized accumulator.
    pub async fn run(self) -> HwpcResult<RunReport> {
        let started = Instant::now();

        info!(
            run = %self.config.run_name,
            id = self.id,
            bucket = %self.config.output_bucket,
            years = self.harvest.years().len(),
            "starting simulation run"
        );

        let mut join_set = JoinSet::new();
        for task in self.model.initial_tasks(&self.harvest) {
            self.spawn_task(&mut join_set, task);
        }

        let (aggregator, tasks_completed) = self.drain(&mut join_set).await?;

        // The progress report is serialized across concurrent runs sharing a cluster.
        {
            let progress = self.cluster.named_lock("progress");
            let _guard = progress.lock().await;
            info!(
                run = %self.config.run_name,
                tasks_completed,
                accumulators = aggregator.len(),
                elapsed = ?started.elapsed(),
                "simulation drained"
            );
        }

        let archives = self.upload_archives(aggregator).await?;

        info!(
            run = %self.config.run_name,
            archives = archives.len(),
            elapsed = ?started.elapsed(),
            "simulation run complete"
        );

        Ok(RunReport {
            archives,
            tasks_completed,
            elapsed: started.elapsed(),
        })
    }

    fn spawn_task(
        &self,
        join_set: &mut JoinSet<HwpcResult<TaskResolution<M::Task>>>,
        task: M::Task,
    ) {
        let cluster = self.cluster.clone();
        let model = self.model.clone();

        join_set.spawn(async move { cluster.run(model.resolve(task)).await? });
    }

    /// Waits for every outstanding task, absorbing results and scheduling children until
    /// the set drains or a task fails.
    async fn drain(
        &self,
        join_set: &mut JoinSet<HwpcResult<TaskResolution<M::Task>>>,
    ) -> HwpcResult<(ResultAggregator, usize)> {
        let mut aggregator = ResultAggregator::new();
        let mut tasks_completed = 0usize;

        while let Some(joined) = join_set.join_next().await {
            let resolution = match joined {
                Ok(Ok(resolution)) => resolution,
                Ok(Err(err)) => {
                    error!("simulation task failed: {err}");

                    self.abort(join_set).await;

                    return Err(err);
                }
                Err(join_err) => {
                    self.abort(join_set).await;

                    return Err(hwpc_error!(
                        ErrorKind::TaskPanic,
                        "Simulation task panicked",
                        join_err
                    ));
                }
            };

            tasks_completed += 1;
            debug!(
                lineage = %resolution.dataset.lineage(),
                children = resolution.children.len(),
                "task resolved"
            );

            if let Err(err) = aggregator.absorb(resolution.dataset) {
                self.abort(join_set).await;

                return Err(err);
            }

            for child in resolution.children {
                self.spawn_task(join_set, child);
            }
        }

        aggregator.attach_harvest(&self.harvest)?;

        Ok((aggregator, tasks_completed))
    }

    /// Cancels all outstanding tasks and releases the worker pool, discarding any state
    /// already accumulated.
    async fn abort(&self, join_set: &mut JoinSet<HwpcResult<TaskResolution<M::Task>>>) {
        self.cluster.shutdown();
        join_set.abort_all();
        while join_set.join_next().await.is_some() {}

        info!(run = %self.config.run_name, "aborted simulation run");
    }

    /// Materializes and uploads one archive per accumulator, the global pair first and
    /// then each harvest year's pair. Upload failures propagate without retry.
    async fn upload_archives(&self, aggregator: ResultAggregator) -> HwpcResult<Vec<String>> {
        let mut archives = Vec::with_capacity(aggregator.len());

        for (key, dataset) in aggregator.iter() {
            let bundle = build_bundle(&self.config.run_name, ReportPrefix::from(key), dataset)?;

            debug!(partition = %key, key = %bundle.key, bytes = bundle.bytes.len(), "uploading archive");

            self.store.upload(&bundle.key, bundle.bytes).await?;
            archives.push(bundle.key);
        }

        Ok(archives)
    }
}
