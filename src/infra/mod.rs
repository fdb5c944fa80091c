//! Infrastructure adapters implementing the application ports.

pub mod sqlite_store;

pub use sqlite_store::{ExportedTable, PostingTable, SqliteStore};
