//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Repository port (durable, file backed)
//! - An in-memory map store for the same port (tests, embedding)

pub mod duckdb;
pub mod memory;

pub use self::duckdb::DuckDbRepository;
pub use self::memory::InMemoryRepository;
