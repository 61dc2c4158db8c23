//! Persisted typed value with lazy load, migrations and auto-sync
//!
//! [`StorageHelper`] owns one typed value keyed by a string identifier and
//! mediates between an external [`StorageAdapter`] and in-memory state. The
//! original popup kept this reactive through an observable box; here the
//! persistence hook runs explicitly from the `set` family of methods, which
//! keeps the contract (changes flow to storage, loads never echo back)
//! without module-level reactivity.
//!
//! # Example
//!
//! ```ignore
//! let settings = StorageHelper::new(
//!     "settings",
//!     MemoryStorage::new(),
//!     StorageOptions::new(Settings::default()),
//! );
//! settings.load().await;
//! settings.update(|s| s.lang_to = "fr".into()).await;
//! ```

use crate::storage::adapter::StorageAdapter;
use crate::storage::error::StorageResult;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Raw-payload rewrite applied on load, before typed deserialization.
/// Migrations run in registration order; each receives the previous output.
pub type Migration = Box<dyn Fn(Value) -> Value + Send + Sync>;

/// Lifecycle flags of a [`StorageHelper`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreFlags {
    /// A load has been initiated at least once
    pub initialized: bool,
    /// A load is currently in flight
    pub loading: bool,
    /// A load has completed (successfully or not)
    pub loaded: bool,
    /// A save is currently in flight
    pub saving: bool,
}

/// Construction options for [`StorageHelper`]
pub struct StorageOptions<T> {
    default_value: T,
    auto_load: bool,
    auto_sync: bool,
    auto_sync_delay: Option<Duration>,
    migrations: Vec<Migration>,
}

impl<T> StorageOptions<T> {
    pub fn new(default_value: T) -> Self {
        Self {
            default_value,
            auto_load: false,
            auto_sync: true,
            auto_sync_delay: None,
            migrations: Vec::new(),
        }
    }

    /// Preload data at construction (requires a running tokio runtime)
    pub fn auto_load(mut self, auto_load: bool) -> Self {
        self.auto_load = auto_load;
        self
    }

    /// Persist changes back to the adapter automatically (default: on)
    pub fn auto_sync(mut self, auto_sync: bool) -> Self {
        self.auto_sync = auto_sync;
        self
    }

    /// Debounce window for auto-sync writes. With a delay configured, the
    /// first save additionally waits until the store is ready so it cannot
    /// race the initial load.
    pub fn auto_sync_delay(mut self, delay: Duration) -> Self {
        self.auto_sync_delay = Some(delay);
        self
    }

    /// Register a migration; migrations run on the raw payload in
    /// registration order
    pub fn migration(mut self, migrate: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.migrations.push(Box::new(migrate));
        self
    }
}

struct Inner<T> {
    key: String,
    storage: Box<dyn StorageAdapter>,
    default_value: T,
    auto_sync: bool,
    auto_sync_delay: Option<Duration>,
    migrations: Vec<Migration>,
    value: Mutex<T>,
    flags: watch::Sender<StoreFlags>,
    revision: AtomicU64,
}

/// Reactive persisted key/value store
///
/// Cheap to clone; clones share the same state, so background save tasks can
/// outlive the handle that scheduled them.
pub struct StorageHelper<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for StorageHelper<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> StorageHelper<T>
where
    T: Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        key: impl Into<String>,
        storage: impl StorageAdapter + 'static,
        options: StorageOptions<T>,
    ) -> Self {
        let (flags, _) = watch::channel(StoreFlags::default());
        let helper = Self {
            inner: Arc::new(Inner {
                key: key.into(),
                storage: Box::new(storage),
                value: Mutex::new(options.default_value.clone()),
                default_value: options.default_value,
                auto_sync: options.auto_sync,
                auto_sync_delay: options.auto_sync_delay,
                migrations: options.migrations,
                flags,
                revision: AtomicU64::new(0),
            }),
        };

        if options.auto_load {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    let preload = helper.clone();
                    handle.spawn(async move { preload.load().await });
                }
                Err(_) => warn!(key = %helper.inner.key, "auto-load skipped, no async runtime"),
            }
        }

        helper
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn default_value(&self) -> &T {
        &self.inner.default_value
    }

    /// Whether `value` is structurally equal to the default
    pub fn is_default(&self, value: &T) -> bool {
        *value == self.inner.default_value
    }

    pub fn is_initialized(&self) -> bool {
        self.flags().initialized
    }

    pub fn is_loading(&self) -> bool {
        self.flags().loading
    }

    pub fn is_loaded(&self) -> bool {
        self.flags().loaded
    }

    pub fn is_saving(&self) -> bool {
        self.flags().saving
    }

    /// Resolves once a load has been initiated and has completed
    pub async fn when_ready(&self) {
        let mut rx = self.inner.flags.subscribe();
        loop {
            {
                let flags = *rx.borrow_and_update();
                if flags.initialized && flags.loaded {
                    return;
                }
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Load the stored payload into memory.
    ///
    /// Idempotent while a load is in flight: concurrent callers await the
    /// same readiness signal instead of re-reading the backend. Migrations
    /// run on the raw payload in registration order; a migrated value equal
    /// to the default is discarded rather than installed. Read errors are
    /// logged and absorbed; the store still becomes ready and callers
    /// proceed on the last known in-memory value.
    pub async fn load(&self) {
        self.do_load(false).await;
    }

    /// Like [`load`](Self::load), but re-reads the backend even when another
    /// load is already in flight
    pub async fn force_load(&self) {
        self.do_load(true).await;
    }

    async fn do_load(&self, force: bool) {
        let mut start_read = false;
        self.inner.flags.send_if_modified(|flags| {
            if flags.loading && !force {
                return false;
            }
            start_read = true;
            flags.initialized = true;
            flags.loading = true;
            true
        });

        if !start_read {
            self.when_ready().await;
            return;
        }

        debug!(key = %self.inner.key, "loading");
        match self.inner.storage.get_item(&self.inner.key).await {
            Ok(Some(raw)) => self.on_data(raw),
            Ok(None) => debug!(key = %self.inner.key, "no stored data, keeping default"),
            Err(err) => warn!(key = %self.inner.key, error = %err, "loading failed"),
        }

        self.update_flags(|flags| {
            flags.loading = false;
            flags.loaded = true;
        });
    }

    fn on_data(&self, raw: Value) {
        let migrated = self
            .inner
            .migrations
            .iter()
            .fold(raw, |data, migrate| migrate(data));

        match serde_json::from_value::<T>(migrated) {
            Ok(value) => {
                if !self.is_default(&value) {
                    // installed silently: loaded data must not echo back
                    *self.value_lock() = value;
                }
            }
            Err(err) => {
                warn!(key = %self.inner.key, error = %err, "discarding malformed stored payload");
            }
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> T {
        self.value_lock().clone()
    }

    /// Replace the value and trigger the auto-sync path
    pub async fn set(&self, value: T) {
        *self.value_lock() = value;
        self.sync_changed().await;
    }

    /// Replace the value without echoing the change to storage
    pub fn set_silent(&self, value: T) {
        *self.value_lock() = value;
    }

    /// Shallow-merge a JSON object patch onto the current value.
    ///
    /// Non-object patches (or patches applied to a non-object value) replace
    /// the document wholesale. The previous value is never mutated in place;
    /// the patch is applied to a serialized snapshot. Fails only when the
    /// merged document no longer deserializes as `T`.
    pub async fn merge(&self, patch: Value) -> StorageResult<()> {
        let mut snapshot = serde_json::to_value(self.get())?;

        let merged = match (snapshot.as_object_mut(), patch) {
            (Some(fields), Value::Object(patch_fields)) => {
                for (name, value) in patch_fields {
                    fields.insert(name, value);
                }
                snapshot
            }
            (_, patch) => patch,
        };

        let next = serde_json::from_value(merged)?;
        self.set(next).await;
        Ok(())
    }

    /// Apply an arbitrary transform to a cloned snapshot, then set the result
    pub async fn update(&self, mutate: impl FnOnce(&mut T)) {
        let mut next = self.get();
        mutate(&mut next);
        self.set(next).await;
    }

    /// Reset the value to the default
    pub async fn reset(&self) {
        self.set(self.inner.default_value.clone()).await;
    }

    async fn sync_changed(&self) {
        if !self.inner.auto_sync {
            return;
        }

        let revision = self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1;
        match self.inner.auto_sync_delay {
            None => self.save_now().await,
            Some(delay) => {
                let helper = self.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    helper.when_ready().await;
                    if helper.inner.revision.load(Ordering::SeqCst) != revision {
                        return; // superseded by a newer change
                    }
                    helper.save_now().await;
                });
            }
        }
    }

    async fn save_now(&self) {
        let raw = match serde_json::to_value(self.get()) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %self.inner.key, error = %err, "saving failed to serialize");
                return;
            }
        };

        debug!(key = %self.inner.key, "saving data to external storage");
        self.update_flags(|flags| flags.saving = true);
        if let Err(err) = self.inner.storage.set_item(&self.inner.key, raw).await {
            warn!(key = %self.inner.key, error = %err, "saving data failed");
        }
        self.update_flags(|flags| flags.saving = false);
    }

    fn flags(&self) -> StoreFlags {
        *self.inner.flags.borrow()
    }

    fn update_flags(&self, change: impl FnOnce(&mut StoreFlags)) {
        self.inner.flags.send_if_modified(|flags| {
            let before = *flags;
            change(flags);
            *flags != before
        });
    }

    fn value_lock(&self) -> MutexGuard<'_, T> {
        self.inner
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
