//! Configuration loading and shared configuration types for carbon accounting runs.

mod environment;
mod load;
pub mod shared;

pub use environment::*;
pub use load::*;
