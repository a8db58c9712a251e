//! SQLite snapshot storage
//!
//! An advisory store for market snapshots and price observations. Write
//! failures are logged and never reach the trading path.

mod schema;
mod store;
mod types;

pub use schema::create_tables;
pub use store::{format_timestamp, SqliteStore};
pub use types::{PriceRecord, StorageStats};
