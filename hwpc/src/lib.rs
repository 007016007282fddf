pub mod aggregate;
pub mod cluster;
pub mod error;
mod macros;
pub mod model;
pub mod report;
pub mod simulation;
pub mod storage;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
