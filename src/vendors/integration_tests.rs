//! End-to-end tests wiring the core together: persisted settings, the
//! registry, vendor rotation and the translator request path, all against
//! deterministic mocks. No network.

use crate::settings::Settings;
use crate::storage::{MemoryStorage, StorageAdapter};
use crate::vendors::mock::{MockMode, MockVendor};
use crate::vendors::registry::TranslatorRegistry;
use crate::vendors::translator::Translator;
use crate::vendors::vendor::{LanguageEntry, VendorLanguages};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const EN_FR_ONLY: &[LanguageEntry] = &[("en", "English"), ("fr", "French")];

fn mapping_vendor(name: &'static str) -> MockVendor {
    let mut map = HashMap::new();
    map.insert(
        ("hello".to_string(), "fr".to_string()),
        "bonjour".to_string(),
    );
    MockVendor::named(name, MockMode::Mappings(map)).with_detected_language("en")
}

#[tokio::test]
async fn test_translate_through_registry_and_persist_choice() {
    let storage = Arc::new(MemoryStorage::new());
    let settings = Settings::storage(storage.clone());
    settings.load().await;

    let mut registry = TranslatorRegistry::new();
    registry.register(Translator::new(mapping_vendor("alpha")).with_fallback_language("en"));
    registry.register(Translator::new(mapping_vendor("beta")).with_fallback_language("en"));

    let current = settings.get();
    let translator = registry
        .get("alpha")
        .filter(|t| t.can_translate(&current.lang_from, "fr"))
        .unwrap();

    let result = translator
        .get_translation(&current.lang_from, "fr", "hello")
        .await
        .unwrap();
    assert_eq!(result.translation, "bonjour");
    assert_eq!(result.vendor, "alpha");
    assert_eq!(translator.last_result().unwrap().translation, "bonjour");

    // remember the choice the way the popup does
    settings
        .merge(json!({ "vendor": "alpha", "langTo": "fr" }))
        .await
        .unwrap();

    let persisted = storage
        .get_item("translator_settings")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(persisted["vendor"], "alpha");
    assert_eq!(persisted["langTo"], "fr");
}

#[tokio::test]
async fn test_vendor_hop_when_current_cannot_serve_the_pair() {
    let mut registry = TranslatorRegistry::new();
    registry.register(
        Translator::new(
            MockVendor::named("limited", MockMode::Suffix)
                .with_languages(VendorLanguages::new(EN_FR_ONLY)),
        )
        .with_fallback_language("en"),
    );
    registry.register(Translator::new(mapping_vendor("capable")).with_fallback_language("en"));

    // "limited" has no German; rotation finds the capable vendor
    let current = registry.get("limited").unwrap();
    assert!(!current.can_translate("en", "de"));

    let next = registry.next_translator("limited", "en", "de", false).unwrap();
    assert_eq!(next.name(), "capable");

    let result = next.get_translation("en", "de", "hello").await.unwrap();
    assert_eq!(result.translation, "hello-de");
}

#[tokio::test]
async fn test_error_then_recovery_keeps_slots_consistent() {
    let mut registry = TranslatorRegistry::new();
    registry.register(
        Translator::new(MockVendor::named("flaky", MockMode::Error("down".into())))
            .with_fallback_language("en"),
    );
    registry.register(Translator::new(mapping_vendor("stable")).with_fallback_language("en"));

    let flaky = registry.get("flaky").unwrap();
    let error = flaky.get_translation("en", "fr", "hello").await.unwrap_err();
    assert_eq!(error.status_text, "down");
    assert!(flaky.last_error().is_some());
    assert!(flaky.last_result().is_none());

    // the UI's "next vendor" action after a failure
    let fallback = registry.next_translator("flaky", "en", "fr", false).unwrap();
    let result = fallback.get_translation("en", "fr", "hello").await.unwrap();
    assert_eq!(result.translation, "bonjour");
    assert!(fallback.last_error().is_none());
}
