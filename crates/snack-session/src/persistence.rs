//! Last visited location
//!
//! One string under one key. Reads happen once at startup; writes are
//! fire-and-forget and never fail the caller.

use std::sync::Arc;

use snack_storage::KeyValueStore;
use tokio::sync::mpsc;

pub const LAST_LOCATION_KEY: &str = "lastSnackURL";

pub struct LastLocation {
    store: Arc<dyn KeyValueStore>,
    /// Ordered background writer, when a runtime was provided
    writer: Option<mpsc::UnboundedSender<String>>,
}

impl LastLocation {
    /// Writes happen inline on the calling thread
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            writer: None,
        }
    }

    /// Writes are queued to a task on `handle` and applied in order
    pub fn spawn_writer(store: Arc<dyn KeyValueStore>, handle: &tokio::runtime::Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let worker_store = Arc::clone(&store);

        handle.spawn(async move {
            while let Some(url) = rx.recv().await {
                let store = Arc::clone(&worker_store);
                let result = tokio::task::spawn_blocking(move || write(store.as_ref(), &url)).await;
                if let Err(e) = result {
                    tracing::error!(error = %e, "Last location writer task failed");
                }
            }
            tracing::debug!("Last location writer stopped");
        });

        Self {
            store,
            writer: Some(tx),
        }
    }

    /// Saved location, if any. Read failures and empty values count as absent.
    pub fn load(&self) -> Option<String> {
        match self.store.get(LAST_LOCATION_KEY) {
            Ok(Some(url)) if !url.trim().is_empty() => Some(url),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read last location");
                None
            }
        }
    }

    pub fn save(&self, url: &str) {
        if let Some(writer) = &self.writer {
            if writer.send(url.to_string()).is_ok() {
                return;
            }
            tracing::debug!("Last location writer gone, writing inline");
        }

        write(self.store.as_ref(), url);
    }
}

impl Clone for LastLocation {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            writer: self.writer.clone(),
        }
    }
}

fn write(store: &dyn KeyValueStore, url: &str) {
    match store.set(LAST_LOCATION_KEY, url) {
        Ok(()) => tracing::debug!(url = %url, "Saved last location"),
        Err(e) => tracing::warn!(url = %url, error = %e, "Failed to save last location"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use snack_storage::{Database, StorageError};
    use std::time::Duration;

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> snack_storage::Result<Option<String>> {
            Err(StorageError::Unavailable("offline".to_string()))
        }

        fn set(&self, _key: &str, _value: &str) -> snack_storage::Result<()> {
            Err(StorageError::Unavailable("offline".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        writes: Mutex<Vec<String>>,
    }

    impl KeyValueStore for RecordingStore {
        fn get(&self, _key: &str) -> snack_storage::Result<Option<String>> {
            Ok(self.writes.lock().last().cloned())
        }

        fn set(&self, _key: &str, value: &str) -> snack_storage::Result<()> {
            self.writes.lock().push(value.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_load_and_save_inline() {
        let db = Database::open_in_memory().unwrap();
        let location = LastLocation::new(Arc::new(db.clone()));

        assert_eq!(location.load(), None);

        location.save("https://expo.dev/accounts/me/snacks/abc");
        assert_eq!(
            db.get_setting(LAST_LOCATION_KEY).unwrap().as_deref(),
            Some("https://expo.dev/accounts/me/snacks/abc")
        );
        assert_eq!(
            location.load().as_deref(),
            Some("https://expo.dev/accounts/me/snacks/abc")
        );
    }

    #[test]
    fn test_empty_value_counts_as_absent() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(LAST_LOCATION_KEY, "").unwrap();

        assert_eq!(LastLocation::new(Arc::new(db)).load(), None);
    }

    #[test]
    fn test_store_failures_are_swallowed() {
        let location = LastLocation::new(Arc::new(FailingStore));

        assert_eq!(location.load(), None);
        location.save("https://expo.dev/foo");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_background_writer_keeps_order() {
        let store = Arc::new(RecordingStore::default());
        let location =
            LastLocation::spawn_writer(store.clone(), &tokio::runtime::Handle::current());

        for i in 0..10 {
            location.save(&format!("https://expo.dev/{i}"));
        }

        let mut waited = Duration::ZERO;
        while store.writes.lock().len() < 10 && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += Duration::from_millis(10);
        }

        let writes = store.writes.lock().clone();
        let expected: Vec<String> = (0..10).map(|i| format!("https://expo.dev/{i}")).collect();
        assert_eq!(writes, expected);
    }
}
