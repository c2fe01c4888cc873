//! The user's selected city.
//!
//! [`CitySelection`] is the single writer of the selection. Readers either
//! call [`CitySelection::get`] or hold a [`watch::Receiver`] from
//! [`CitySelection::subscribe`]; both always observe a whole `Option<City>`.
//! Every change is written through to the [`KeyValueStore`] in the
//! background, and a failed write only costs the selection on next start.

use std::sync::{Arc, Mutex, PoisonError};

use pricewise_core::City;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::store::KeyValueStore;

/// Store key holding the JSON-encoded selected city.
pub const CITY_KEY: &str = "selectedCity";

pub struct CitySelection<K> {
    current: watch::Sender<Option<City>>,
    store: Arc<K>,
    pending_write: Mutex<Option<JoinHandle<()>>>,
}

impl<K: KeyValueStore> CitySelection<K> {
    /// Creates an empty selection backed by `store`. Call
    /// [`CitySelection::hydrate`] once at startup to restore the saved city.
    pub fn new(store: Arc<K>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current,
            store,
            pending_write: Mutex::new(None),
        }
    }

    /// Creates a selection and immediately hydrates it from `store`.
    pub fn hydrated(store: Arc<K>) -> Self {
        let selection = Self::new(store);
        selection.hydrate();
        selection
    }

    /// Loads the saved city from the store.
    ///
    /// Missing, unreadable or malformed data leaves no city selected.
    pub fn hydrate(&self) -> Option<City> {
        let city = match self.store.get(CITY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<City>(&raw) {
                Ok(city) => Some(city),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed saved city");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "could not read saved city");
                None
            }
        };

        if let Some(city) = &city {
            tracing::debug!(city_id = %city.id, "restored selected city");
        }
        self.current.send_replace(city.clone());
        city
    }

    #[must_use]
    pub fn get(&self) -> Option<City> {
        self.current.borrow().clone()
    }

    /// Receiver notified on every change of the selection.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<City>> {
        self.current.subscribe()
    }

    /// Selects `city`.
    ///
    /// The new value is visible to every reader before this returns. The
    /// store write happens afterwards, in order with earlier writes, on the
    /// blocking pool when a Tokio runtime is available and inline otherwise.
    pub fn set(&self, city: City) {
        tracing::info!(city_id = %city.id, city = %city.name, "selected city changed");
        let encoded = serde_json::to_string(&city).map_err(|source| StoreError::Encode {
            key: CITY_KEY.to_owned(),
            source,
        });
        self.current.send_replace(Some(city));

        let encoded = match encoded {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::warn!(error = %e, "could not persist selected city");
                return;
            }
        };

        let store = Arc::clone(&self.store);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            persist(store.as_ref(), &encoded);
            return;
        };

        let mut pending = self
            .pending_write
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = pending.take();
        *pending = Some(runtime.spawn(async move {
            if let Some(previous) = previous {
                if let Err(e) = previous.await {
                    tracing::warn!(error = %e, "earlier selected city write task failed");
                }
            }
            let write = tokio::task::spawn_blocking(move || persist(store.as_ref(), &encoded));
            if let Err(e) = write.await {
                tracing::warn!(error = %e, "selected city write task failed");
            }
        }));
    }

    /// Waits for the most recent background write to finish.
    pub async fn flush(&self) {
        let pending = self
            .pending_write
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            if let Err(e) = handle.await {
                tracing::warn!(error = %e, "selected city write task failed");
            }
        }
    }
}

fn persist<K: KeyValueStore>(store: &K, encoded: &str) {
    if let Err(e) = store.set(CITY_KEY, encoded) {
        tracing::warn!(error = %e, "could not persist selected city");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::store::{FileStore, MemoryStore};

    /// Panics on its first write, then behaves like a `MemoryStore`.
    struct FlakyStore {
        failed: AtomicBool,
        inner: MemoryStore,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            assert!(self.failed.swap(true, Ordering::SeqCst), "disk went away");
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn campinas() -> City {
        City {
            id: "c1".into(),
            name: "Campinas".into(),
            state: "Sao Paulo".into(),
            state_code: Some("SP".into()),
        }
    }

    fn recife() -> City {
        City {
            id: "c2".into(),
            name: "Recife".into(),
            state: "Pernambuco".into(),
            state_code: None,
        }
    }

    #[test]
    fn hydrate_without_saved_city_is_unset() {
        let selection = CitySelection::new(Arc::new(MemoryStore::new()));
        assert_eq!(selection.hydrate(), None);
        assert_eq!(selection.get(), None);
    }

    #[test]
    fn hydrate_with_malformed_json_is_unset() {
        let store = MemoryStore::with_entry(CITY_KEY, "{\"id\": 12, \"name\"");
        let selection = CitySelection::hydrated(Arc::new(store));
        assert_eq!(selection.get(), None);
    }

    #[test]
    fn hydrate_with_wrong_shape_is_unset() {
        let store = MemoryStore::with_entry(CITY_KEY, "\"Campinas\"");
        let selection = CitySelection::hydrated(Arc::new(store));
        assert_eq!(selection.get(), None);
    }

    #[test]
    fn hydrate_restores_saved_city() {
        let raw = serde_json::to_string(&campinas()).unwrap();
        let selection = CitySelection::hydrated(Arc::new(MemoryStore::with_entry(CITY_KEY, &raw)));
        assert_eq!(selection.get(), Some(campinas()));
    }

    #[test]
    fn set_outside_runtime_writes_inline() {
        let store = Arc::new(MemoryStore::new());
        let selection = CitySelection::new(Arc::clone(&store));

        selection.set(campinas());

        assert_eq!(selection.get(), Some(campinas()));
        let saved = store.get(CITY_KEY).unwrap().expect("city should be saved");
        assert_eq!(serde_json::from_str::<City>(&saved).unwrap(), campinas());
    }

    #[tokio::test]
    async fn set_is_visible_immediately_and_persists_in_order() {
        let store = Arc::new(MemoryStore::new());
        let selection = CitySelection::new(Arc::clone(&store));

        selection.set(campinas());
        assert_eq!(selection.get(), Some(campinas()));
        selection.set(recife());
        assert_eq!(selection.get(), Some(recife()));

        selection.flush().await;
        let saved = store.get(CITY_KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<City>(&saved).unwrap(), recife());
    }

    #[tokio::test]
    async fn subscribers_see_each_change() {
        let selection = CitySelection::new(Arc::new(MemoryStore::new()));
        let mut rx = selection.subscribe();
        assert_eq!(*rx.borrow(), None);

        selection.set(campinas());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(campinas()));

        selection.set(recife());
        rx.changed().await.unwrap();
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.map(|c| c.id), Some("c2".to_string()));
        selection.flush().await;
    }

    #[tokio::test]
    async fn persistence_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "not a directory").unwrap();
        let selection = CitySelection::new(Arc::new(FileStore::new(&blocker)));

        selection.set(campinas());
        selection.flush().await;

        assert_eq!(selection.get(), Some(campinas()));
    }

    #[tokio::test]
    async fn later_write_lands_after_a_failed_write_task() {
        let store = Arc::new(FlakyStore {
            failed: AtomicBool::new(false),
            inner: MemoryStore::new(),
        });
        let selection = CitySelection::new(Arc::clone(&store));

        selection.set(campinas());
        selection.set(recife());
        selection.flush().await;

        assert_eq!(selection.get(), Some(recife()));
        let saved = store.get(CITY_KEY).unwrap().expect("second write should land");
        assert_eq!(serde_json::from_str::<City>(&saved).unwrap(), recife());
    }

    #[tokio::test]
    async fn file_store_round_trip_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));

        let first = CitySelection::new(Arc::clone(&store));
        first.set(recife());
        first.flush().await;

        let second = CitySelection::hydrated(store);
        assert_eq!(second.get(), Some(recife()));
    }
}
