/// Persisted Storage Module
///
/// A reactive, lazily-loaded, auto-persisting key/value store plus the
/// backend seam it talks through:
///
/// 1. **Adapter** - async backend trait with in-memory and JSON-file impls
/// 2. **Helper** - typed store with migrations, debounced auto-sync and a
///    readiness signal
///
/// Backends exchange raw `serde_json::Value` payloads; the typed value only
/// exists on the helper side, after migrations have run.
pub mod adapter;
pub mod error;
pub mod helper;

pub use adapter::{FileStorage, MemoryStorage, StorageAdapter};
pub use error::{StorageError, StorageResult};
pub use helper::{Migration, StorageHelper, StorageOptions, StoreFlags};
