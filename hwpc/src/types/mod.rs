//! Core data model for the carbon accounting engine.
//!
//! Defines the lineage chain that traces material through recycling generations, the
//! multi-dimensional [`Dataset`] that partial simulation results are expressed in, the
//! input [`HarvestSeries`], and the year-indexed [`Table`] shape used by reporting.

mod dataset;
mod lineage;
mod table;

pub use dataset::*;
pub use lineage::*;
pub use table::*;
