//! Snack Shell Storage Layer
//!
//! SQLite-backed key-value persistence for shell state that must survive
//! a restart. The only consumer today is the last-visited location.

mod database;
mod error;
mod store;

pub use database::Database;
pub use error::StorageError;
pub use store::KeyValueStore;

pub type Result<T> = std::result::Result<T, StorageError>;
