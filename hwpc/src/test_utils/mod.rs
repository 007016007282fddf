//! Shared helpers for testing simulation runs.

mod dataset;
mod model;

pub use dataset::scripted_dataset;
pub use model::{ScriptedModel, ScriptedTask};
