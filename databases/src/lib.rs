//! CoTools Databases
//!
//! The embedded SQLite persistence layer: one store backing both the tool
//! catalogue (hydration/flush) and the append-only interaction log. The
//! reasoning core only sees the contracts from `cotools-core`; everything
//! rusqlite-specific lives here.

pub mod sqlite;

pub use sqlite::SqliteStore;
