//! Storage backends for the analysis batch.

mod convert;
pub mod database;
pub mod memory;

pub use database::DatabaseStore;
pub use memory::MemoryStore;
