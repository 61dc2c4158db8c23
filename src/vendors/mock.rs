//! Mock vendor for tests and offline use
//!
//! A deterministic, network-free [`Vendor`] implementation. Modes cover the
//! scenarios the core needs to exercise: plain suffixing, echoing the input
//! unchanged (which is what drives the auto-swap heuristic), canned
//! mappings, and simulated failures.
//!
//! # Example
//!
//! ```ignore
//! let mock = MockVendor::new(MockMode::Suffix);
//! let result = mock.translate("en", "fr", "hello").await.unwrap();
//! assert_eq!(result.translation, "hello-fr");
//! ```

use crate::vendors::error::TranslationError;
use crate::vendors::result::TranslationResult;
use crate::vendors::vendor::{LanguageEntry, Vendor, VendorInfo, VendorLanguages};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const MOCK_LANGUAGES: &[LanguageEntry] = &[
    ("auto", "Auto-detect"),
    ("de", "German"),
    ("en", "English"),
    ("fr", "French"),
    ("ru", "Russian"),
];

/// Mock translation modes
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target language: "hello" → "hello-fr"
    Suffix,
    /// Return the input unchanged (triggers auto-swap upstream)
    Echo,
    /// Predefined `(text, target)` → translation mappings, suffix fallback
    Mappings(HashMap<(String, String), String>),
    /// Fail every request with the given detail
    Error(String),
}

/// Deterministic vendor that simulates translation scenarios
pub struct MockVendor {
    name: &'static str,
    mode: MockMode,
    languages: VendorLanguages,
    detected: Option<&'static str>,
    text_max_length: Option<usize>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockVendor {
    pub fn new(mode: MockMode) -> Self {
        Self::named("mock", mode)
    }

    /// Mock with a distinct code name, for registry tests that need several
    pub fn named(name: &'static str, mode: MockMode) -> Self {
        Self {
            name,
            mode,
            languages: VendorLanguages::new(MOCK_LANGUAGES),
            detected: None,
            text_max_length: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Override the language tables this mock declares
    pub fn with_languages(mut self, languages: VendorLanguages) -> Self {
        self.languages = languages;
        self
    }

    /// Report `lang` as the detected source language on every result
    pub fn with_detected_language(mut self, lang: &'static str) -> Self {
        self.detected = Some(lang);
        self
    }

    /// Declare a request text limit
    pub fn with_text_max_length(mut self, limit: usize) -> Self {
        self.text_max_length = Some(limit);
        self
    }

    /// Simulate network latency
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// How many translate requests this mock has served
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply_mode(&self, to: &str, text: &str) -> Result<String, TranslationError> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}-{}", text, to)),
            MockMode::Echo => Ok(text.to_string()),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), to.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}-{}", text, to)))
            }
            MockMode::Error(detail) => Err(TranslationError::network(
                "mock://translate",
                detail.clone(),
            )),
        }
    }
}

#[async_trait]
impl Vendor for MockVendor {
    fn info(&self) -> VendorInfo {
        let info = VendorInfo::new(self.name, "Mock", "mock://translate", "mock://translate");
        match self.text_max_length {
            Some(limit) => info.text_max_length(limit),
            None => info,
        }
    }

    fn languages(&self) -> &VendorLanguages {
        &self.languages
    }

    async fn translate(
        &self,
        _from: &str,
        to: &str,
        text: &str,
    ) -> Result<TranslationResult, TranslationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let translation = self.apply_mode(to, text)?;
        Ok(TranslationResult {
            translation,
            lang_detected: self.detected.map(str::to_string),
            ..TranslationResult::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Mode Tests ==========

    #[tokio::test]
    async fn test_suffix_mode() {
        let mock = MockVendor::new(MockMode::Suffix);
        let result = mock.translate("en", "fr", "hello").await.unwrap();
        assert_eq!(result.translation, "hello-fr");
    }

    #[tokio::test]
    async fn test_echo_mode_returns_input_unchanged() {
        let mock = MockVendor::new(MockMode::Echo);
        let result = mock.translate("auto", "en", "bonjour").await.unwrap();
        assert_eq!(result.translation, "bonjour");
    }

    #[tokio::test]
    async fn test_mapping_mode_with_fallback() {
        let mut map = HashMap::new();
        map.insert(("hello".to_string(), "fr".to_string()), "bonjour".to_string());
        let mock = MockVendor::new(MockMode::Mappings(map));

        let mapped = mock.translate("en", "fr", "hello").await.unwrap();
        assert_eq!(mapped.translation, "bonjour");

        let unmapped = mock.translate("en", "fr", "goodbye").await.unwrap();
        assert_eq!(unmapped.translation, "goodbye-fr");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let mock = MockVendor::new(MockMode::Error("API unavailable".into()));
        let error = mock.translate("en", "fr", "hello").await.unwrap_err();
        assert_eq!(error.status_code, 0);
        assert_eq!(error.status_text, "API unavailable");
    }

    // ========== Configuration Tests ==========

    #[tokio::test]
    async fn test_detected_language_is_reported() {
        let mock = MockVendor::new(MockMode::Echo).with_detected_language("en");
        let result = mock.translate("auto", "en", "hello").await.unwrap();
        assert_eq!(result.lang_detected.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn test_call_counter() {
        let mock = MockVendor::new(MockMode::Suffix);
        mock.translate("en", "fr", "a").await.unwrap();
        mock.translate("en", "fr", "b").await.unwrap();
        assert_eq!(mock.calls(), 2);
    }

    #[test]
    fn test_default_languages_include_auto() {
        let mock = MockVendor::new(MockMode::Suffix);
        assert!(mock.can_translate("auto", "fr"));
        assert!(!mock.can_translate("xx", "fr"));
    }
}
