//! Tracing setup shared by binaries and tests.

mod tracing;

pub use tracing::*;
