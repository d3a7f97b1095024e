use std::sync::mpsc::Receiver;

use crate::errors::CoreError;

/// A change made to a storage key by some other view of the same storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    /// `None` when the key was removed
    pub new_value: Option<String>,
}

/// Live registration for change events on one key.
///
/// Events are buffered until drained with [`Subscription::drain`].
/// Dropping the subscription unregisters the listener.
pub struct Subscription {
    key: String,
    receiver: Receiver<StorageEvent>,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// `release` runs exactly once, when the subscription is dropped.
    pub fn new(
        key: impl Into<String>,
        receiver: Receiver<StorageEvent>,
        release: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            key: key.into(),
            receiver,
            release: Some(Box::new(release)),
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Take every event delivered so far, oldest first. Never blocks.
    pub fn drain(&self) -> Vec<StorageEvent> {
        self.receiver.try_iter().collect()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("key", &self.key).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// Trait abstraction over the persistent key-value storage.
///
/// One value per string key. Implementations decide durability; the finance
/// store only needs get/set/remove and, optionally, a change feed for
/// writes made through other views of the same storage.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError>;

    fn remove_item(&self, key: &str) -> Result<(), CoreError>;

    /// Register for changes to `key` made elsewhere.
    /// Storages without a change feed return `None`.
    fn subscribe(&self, _key: &str) -> Option<Subscription> {
        None
    }
}
