//! Persistence boundary for the item collection.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use stockscan_inventory::Item;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("storage failure: {0}")]
    Storage(String),
    #[error("failed to serialize inventory: {0}")]
    Serialize(String),
    #[error("async runtime unavailable: {0}")]
    Runtime(String),
}

/// Load/save of the full item collection as one opaque snapshot.
///
/// `load` is called once at startup; `save` after every successful mutation.
/// In-memory state stays authoritative when `save` fails.
pub trait PersistenceGateway {
    /// Previously saved items. Absent or unreadable data yields an empty list.
    fn load(&self) -> Vec<Item>;

    fn save(&self, items: &[Item]) -> Result<(), PersistenceError>;

    fn load_preference(&self, _key: &str) -> Option<String> {
        None
    }

    fn save_preference(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    items: Vec<Item>,
    preferences: HashMap<String, String>,
    saves: usize,
    failing: bool,
}

/// Process-local gateway for tests and dry runs.
///
/// Cheap to clone; clones share the same state, so a test can keep a handle
/// while the app owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot, as if loaded from disk.
    pub fn with_items(items: Vec<Item>) -> Self {
        let gateway = Self::new();
        if let Ok(mut state) = gateway.state.lock() {
            state.items = items;
        }
        gateway
    }

    /// Make every following `save` fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.failing = failing;
        }
    }

    pub fn saved_items(&self) -> Vec<Item> {
        self.state.lock().map(|s| s.items.clone()).unwrap_or_default()
    }

    pub fn save_count(&self) -> usize {
        self.state.lock().map(|s| s.saves).unwrap_or(0)
    }
}

impl PersistenceGateway for InMemoryGateway {
    fn load(&self) -> Vec<Item> {
        self.saved_items()
    }

    fn save(&self, items: &[Item]) -> Result<(), PersistenceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| PersistenceError::Storage("in-memory state poisoned".to_string()))?;
        if state.failing {
            return Err(PersistenceError::Storage("simulated save failure".to_string()));
        }
        state.items = items.to_vec();
        state.saves += 1;
        Ok(())
    }

    fn load_preference(&self, key: &str) -> Option<String> {
        self.state.lock().ok()?.preferences.get(key).cloned()
    }

    fn save_preference(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| PersistenceError::Storage("in-memory state poisoned".to_string()))?;
        state.preferences.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
