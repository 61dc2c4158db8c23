//! translet: the core of an inline translation popup.
//!
//! Two halves:
//!
//! - [`storage`]: a reactive, lazily-loaded, auto-persisting key/value store
//!   with migration support, behind a pluggable backend seam
//! - [`vendors`]: web-translation service adapters (Bing, Google, mock)
//!   normalized to one result shape, wrapped with request memoization, an
//!   automatic language-swap heuristic and rotating vendor selection
//!
//! Rendering, text-to-speech playback and the rest of the UI are consumers
//! of these types, not part of the crate.

pub mod locale;
pub mod settings;
pub mod storage;
pub mod vendors;

pub use settings::Settings;
pub use storage::{
    FileStorage, MemoryStorage, StorageAdapter, StorageError, StorageHelper, StorageOptions,
};
pub use vendors::{
    Bing, Google, MockMode, MockVendor, TranslationError, TranslationResult, Translator,
    TranslatorRegistry, Vendor, VendorInfo, VendorLanguages,
};
