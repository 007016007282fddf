//! Object storage for finished result archives.
//!
//! Uploads go through the [`ObjectStore`] trait so runs can target an in-memory store in
//! tests and the filesystem store in real runs.

mod base;
mod fs;
mod memory;

pub use base::ObjectStore;
pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
