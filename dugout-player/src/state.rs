//! Shared service state
//!
//! Thread-safe state shared by the engine and the HTTP handlers: the event
//! bus, the data store and the runtime settings.

use crate::db::settings::RuntimeSettings;
use crate::error::{Error, Result};
use dugout_common::{DugoutEvent, EventBus};
use dugout_store::DataStore;
use std::sync::Mutex;
use tokio::sync::{broadcast, RwLock};

/// Shared state accessible by all components
///
/// The store has no locking of its own; every access goes through the
/// mutex here, and store closures never await.
pub struct SharedState {
    /// Event broadcaster for SSE events
    pub bus: EventBus,

    store: Mutex<DataStore>,

    /// Tunables read at the start of every play request
    settings: RwLock<RuntimeSettings>,
}

impl SharedState {
    /// Wrap a store, attaching it to the bus so mutations emit `StoreChanged`
    pub fn new(mut store: DataStore, settings: RuntimeSettings, bus: EventBus) -> Self {
        store.attach_event_bus(bus.clone());
        Self {
            bus,
            store: Mutex::new(store),
            settings: RwLock::new(settings),
        }
    }

    /// Run a store operation under the store lock
    pub fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DataStore) -> dugout_store::Result<T>,
    {
        let mut store = self
            .store
            .lock()
            .map_err(|_| Error::Internal("data store lock poisoned".to_string()))?;
        Ok(f(&mut store)?)
    }

    /// Read from the store under the store lock
    pub fn read_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&DataStore) -> T,
    {
        let store = self
            .store
            .lock()
            .map_err(|_| Error::Internal("data store lock poisoned".to_string()))?;
        Ok(f(&store))
    }

    /// Stop handing snapshots to the writer so it can drain and exit
    pub fn close_persistence(&self) -> Result<()> {
        self.with_store(|store| {
            store.detach_sink();
            Ok(())
        })
    }

    pub async fn settings(&self) -> RuntimeSettings {
        self.settings.read().await.clone()
    }

    pub async fn set_settings(&self, settings: RuntimeSettings) {
        *self.settings.write().await = settings;
    }

    /// Subscribe to event stream for SSE
    pub fn subscribe_events(&self) -> broadcast::Receiver<DugoutEvent> {
        self.bus.subscribe()
    }
}
