use std::collections::HashMap;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::errors::CoreError;

use super::traits::{KeyValueStorage, StorageEvent, Subscription};

struct Listener {
    id: u64,
    view_id: u64,
    key: String,
    sender: Sender<StorageEvent>,
}

#[derive(Default)]
struct Area {
    values: HashMap<String, String>,
    listeners: Vec<Listener>,
    next_id: u64,
    quota_bytes: Option<usize>,
}

impl Area {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn used_bytes_with(&self, key: &str, value: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }

    /// Deliver to listeners of `key` on every view except the writer's.
    fn notify(&mut self, writer: u64, event: StorageEvent) {
        self.listeners.retain(|l| {
            if l.key != event.key || l.view_id == writer {
                return true;
            }
            l.sender.send(event.clone()).is_ok()
        });
    }
}

/// One shared in-memory storage area, like a browser origin's local storage.
///
/// Each consumer works through its own [`StorageView`]. A write through one
/// view raises a [`StorageEvent`] on every other view subscribed to that
/// key, and only when the stored value actually changed.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    area: Arc<Mutex<Area>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// A storage area that rejects writes pushing it past `quota_bytes`
    /// (keys plus values, in UTF-8 bytes).
    pub fn with_quota(quota_bytes: usize) -> Self {
        let storage = Self::default();
        storage.lock().quota_bytes = Some(quota_bytes);
        storage
    }

    /// Open a new view onto this area.
    pub fn view(&self) -> StorageView {
        let id = self.lock().next_id();
        StorageView {
            id,
            area: Arc::clone(&self.area),
        }
    }

    /// Number of live subscriptions across all views.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }

    fn lock(&self) -> MutexGuard<'_, Area> {
        lock_area(&self.area)
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let area = self.lock();
        f.debug_struct("MemoryStorage")
            .field("keys", &area.values.len())
            .field("listeners", &area.listeners.len())
            .field("quota_bytes", &area.quota_bytes)
            .finish()
    }
}

/// A single consumer's handle onto a [`MemoryStorage`] area.
pub struct StorageView {
    id: u64,
    area: Arc<Mutex<Area>>,
}

impl KeyValueStorage for StorageView {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(lock_area(&self.area).values.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut area = lock_area(&self.area);
        if let Some(quota) = area.quota_bytes {
            let needed = area.used_bytes_with(key, value);
            if needed > quota {
                return Err(CoreError::Storage(format!(
                    "Quota exceeded: {needed} bytes needed, {quota} allowed"
                )));
            }
        }

        let old_value = area.values.insert(key.to_string(), value.to_string());
        if old_value.as_deref() != Some(value) {
            area.notify(
                self.id,
                StorageEvent {
                    key: key.to_string(),
                    old_value,
                    new_value: Some(value.to_string()),
                },
            );
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        let mut area = lock_area(&self.area);
        if let Some(old_value) = area.values.remove(key) {
            area.notify(
                self.id,
                StorageEvent {
                    key: key.to_string(),
                    old_value: Some(old_value),
                    new_value: None,
                },
            );
        }
        Ok(())
    }

    fn subscribe(&self, key: &str) -> Option<Subscription> {
        let (sender, receiver) = mpsc::channel();
        let listener_id = {
            let mut area = lock_area(&self.area);
            let id = area.next_id();
            area.listeners.push(Listener {
                id,
                view_id: self.id,
                key: key.to_string(),
                sender,
            });
            id
        };

        let weak: Weak<Mutex<Area>> = Arc::downgrade(&self.area);
        Some(Subscription::new(key, receiver, move || {
            if let Some(area) = weak.upgrade() {
                lock_area(&area).listeners.retain(|l| l.id != listener_id);
            }
        }))
    }
}

impl std::fmt::Debug for StorageView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageView").field("id", &self.id).finish()
    }
}

/// Storage that refuses every operation, as when the host has local
/// storage disabled. A store on top of it runs purely in memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl KeyValueStorage for UnavailableStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, CoreError> {
        Err(CoreError::StorageUnavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), CoreError> {
        Err(CoreError::StorageUnavailable)
    }

    fn remove_item(&self, _key: &str) -> Result<(), CoreError> {
        Err(CoreError::StorageUnavailable)
    }
}

// A panic while holding the lock cannot leave the map half-written,
// so a poisoned lock is still safe to use.
fn lock_area(area: &Mutex<Area>) -> MutexGuard<'_, Area> {
    area.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
