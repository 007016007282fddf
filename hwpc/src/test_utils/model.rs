use crate::bail;
use crate::error::{ErrorKind, HwpcResult};
use crate::model::{SimulationModel, TaskResolution};
use crate::test_utils::scripted_dataset;
use crate::types::{HarvestSeries, Lineage, Year};

/// A task of the [`ScriptedModel`], identified purely by its lineage.
#[derive(Debug, Clone)]
pub struct ScriptedTask {
    lineage: Lineage,
}

/// A deterministic model for exercising the scheduling engine.
///
/// Each harvest year yields one primary task whose resolution spawns exactly one
/// recycling child. A specific year's child can be scripted to fail, which lets tests
/// drive the abort path of a run.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    fail_child_of: Option<Year>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the recycling child of `year` fail when resolved.
    pub fn with_failing_child(year: Year) -> Self {
        Self {
            fail_child_of: Some(year),
        }
    }
}

impl SimulationModel for ScriptedModel {
    type Task = ScriptedTask;

    fn initial_tasks(&self, harvest: &HarvestSeries) -> Vec<ScriptedTask> {
        harvest
            .years()
            .iter()
            .map(|&year| ScriptedTask {
                lineage: Lineage::for_year(year),
            })
            .collect()
    }

    async fn resolve(&self, task: ScriptedTask) -> HwpcResult<TaskResolution<ScriptedTask>> {
        if task.lineage.is_recycled()
            && self.fail_child_of == Some(task.lineage.harvest_year())
        {
            bail!(
                ErrorKind::TaskFailed,
                "Scripted task failure",
                task.lineage.to_string()
            );
        }

        let children = if task.lineage.is_recycled() {
            Vec::new()
        } else {
            vec![ScriptedTask {
                lineage: task.lineage.child(1),
            }]
        };

        Ok(TaskResolution {
            dataset: scripted_dataset(task.lineage, 1.0),
            children,
        })
    }
}
