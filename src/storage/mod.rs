//! Storage Gateway Module
//!
//! The durable key/value table the cache writes through to. The cache only
//! speaks the CRUD verbs of [`StorageGateway`]; the engine behind it is
//! chosen by the integrator.
//!
//! # Backends
//! - [`SqliteGateway`]: one SQLite table, on disk or in memory
//! - [`MemoryGateway`]: in-process table with failure injection for tests

mod gateway;
mod memory;
mod sqlite;

pub use gateway::{Predicate, StorageGateway, StoredRow};
pub use memory::MemoryGateway;
pub use sqlite::SqliteGateway;
