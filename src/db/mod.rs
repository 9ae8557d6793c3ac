//! PostgreSQL record store.

pub mod connection;
pub mod records;

pub use connection::{connect, get_version, test_connection};
pub use records::PgRecordStore;
