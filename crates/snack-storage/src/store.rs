//! Key-value store seam
//!
//! The shell only needs `get`/`set` on string keys. `Database` is the
//! durable implementation; anything else (tests, alternative backends)
//! can stand in behind the trait.

use crate::database::Database;
use crate::Result;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl KeyValueStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_setting(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_setting(key, value)
    }
}
