//! Shared configuration types for carbon accounting runs.

mod base;
mod cluster;
mod run;
mod storage;

pub use base::ValidationError;
pub use cluster::ClusterConfig;
pub use run::RunConfig;
pub use storage::StorageConfig;
