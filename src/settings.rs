//! Persisted popup settings
//!
//! The typed value the UI layer binds to: which vendor is selected and the
//! current language pair. Stored under the `translator_settings` key.

use crate::locale;
use crate::storage::{StorageAdapter, StorageHelper, StorageOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const SETTINGS_STORAGE_KEY: &str = "translator_settings";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub vendor: String,
    pub lang_from: String,
    pub lang_to: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vendor: "google".into(),
            lang_from: "auto".into(),
            lang_to: locale::system_language(),
        }
    }
}

impl Settings {
    /// Storage helper for the settings, with the legacy-payload migrations
    /// wired in
    pub fn storage(adapter: impl StorageAdapter + 'static) -> StorageHelper<Settings> {
        StorageHelper::new(
            SETTINGS_STORAGE_KEY,
            adapter,
            StorageOptions::new(Settings::default()).migration(rename_legacy_translator_field),
        )
    }
}

/// Early builds persisted the vendor under `translator`
fn rename_legacy_translator_field(mut raw: Value) -> Value {
    if let Some(fields) = raw.as_object_mut()
        && !fields.contains_key("vendor")
        && let Some(legacy) = fields.remove("translator")
    {
        fields.insert("vendor".into(), legacy);
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.vendor, "google");
        assert_eq!(settings.lang_from, "auto");
        assert!(!settings.lang_to.is_empty());
    }

    #[test]
    fn test_legacy_field_rename() {
        let raw = json!({ "translator": "bing", "langFrom": "en", "langTo": "de" });
        let migrated = rename_legacy_translator_field(raw);
        assert_eq!(migrated["vendor"], "bing");
        assert!(migrated.get("translator").is_none());
    }

    #[test]
    fn test_legacy_rename_keeps_explicit_vendor() {
        let raw = json!({ "translator": "bing", "vendor": "google" });
        let migrated = rename_legacy_translator_field(raw);
        assert_eq!(migrated["vendor"], "google");
    }

    #[tokio::test]
    async fn test_load_migrates_legacy_payload() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(
                SETTINGS_STORAGE_KEY,
                json!({ "translator": "bing", "langFrom": "en", "langTo": "de" }),
            )
            .await
            .unwrap();

        let helper = Settings::storage(storage);
        helper.load().await;

        let settings = helper.get();
        assert_eq!(settings.vendor, "bing");
        assert_eq!(settings.lang_from, "en");
        assert_eq!(settings.lang_to, "de");
    }
}
