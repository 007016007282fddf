//! The seam between the scheduling engine and a concrete carbon model.
//!
//! The engine owns task scheduling, accumulation, and reporting; what a task actually
//! computes is behind [`SimulationModel`]. A model describes the initial task per harvest
//! year and resolves each task into a partial result plus any follow-on recycling tasks,
//! which is what makes the task graph dynamic.

use crate::error::HwpcResult;
use crate::types::{Dataset, HarvestSeries};

/// Outcome of resolving one simulation task.
#[derive(Debug)]
pub struct TaskResolution<T> {
    /// The partial result this task contributes to the accumulators.
    pub dataset: Dataset,
    /// Follow-on tasks discovered while resolving, typically recycling generations.
    pub children: Vec<T>,
}

impl<T> TaskResolution<T> {
    /// Creates a resolution with no follow-on tasks.
    pub fn leaf(dataset: Dataset) -> Self {
        Self {
            dataset,
            children: Vec::new(),
        }
    }
}

/// A concrete carbon model driven by the simulation engine.
///
/// Implementations must be cheap to share across workers; the engine wraps the model in
/// an [`std::sync::Arc`] and resolves many tasks concurrently.
pub trait SimulationModel {
    /// The unit of work this model schedules.
    type Task: Send + 'static;

    /// Returns the initial tasks of a run, one per harvest year of the input series.
    fn initial_tasks(&self, harvest: &HarvestSeries) -> Vec<Self::Task>;

    /// Resolves one task into its partial result and any tasks it spawns.
    fn resolve(
        &self,
        task: Self::Task,
    ) -> impl Future<Output = HwpcResult<TaskResolution<Self::Task>>> + Send;
}
