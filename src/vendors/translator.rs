//! Stateful wrapper around a vendor
//!
//! [`Translator`] adds the cross-cutting request behavior every vendor
//! shares: a single-slot result memo, text truncation, request-metadata
//! stamping, the last result/error slots the popup renders from, and the
//! automatic language-swap heuristic.
//!
//! The memo is deliberately a single slot, not a keyed cache: it only ever
//! matches the immediately preceding request, which is exactly what a popup
//! re-rendering the same selection needs, and interleaved requests for
//! different pairs can never see stale cross-talk.

use crate::locale;
use crate::vendors::error::TranslationError;
use crate::vendors::result::TranslationResult;
use crate::vendors::vendor::{Vendor, VendorInfo, VendorLanguages};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct RequestState {
    last_result: Option<Arc<TranslationResult>>,
    last_error: Option<TranslationError>,
    auto_swap_used: bool,
}

/// One vendor plus its per-instance request state
pub struct Translator {
    vendor: Arc<dyn Vendor>,
    state: Mutex<RequestState>,
    fallback_lang: String,
}

impl Translator {
    pub fn new(vendor: impl Vendor + 'static) -> Self {
        Self::from_arc(Arc::new(vendor))
    }

    pub fn from_arc(vendor: Arc<dyn Vendor>) -> Self {
        Self {
            vendor,
            state: Mutex::new(RequestState::default()),
            fallback_lang: locale::system_language(),
        }
    }

    /// Override the language auto-swap falls back to (default: the system
    /// language)
    pub fn with_fallback_language(mut self, lang: impl Into<String>) -> Self {
        self.fallback_lang = lang.into();
        self
    }

    pub fn info(&self) -> VendorInfo {
        self.vendor.info()
    }

    /// Vendor code name, e.g. "bing"
    pub fn name(&self) -> &'static str {
        self.vendor.info().name
    }

    pub fn languages(&self) -> VendorLanguages {
        *self.vendor.languages()
    }

    pub fn can_translate(&self, from: &str, to: &str) -> bool {
        self.vendor.can_translate(from, to)
    }

    pub fn audio_url(&self, lang: &str, text: &str) -> Option<String> {
        self.vendor.audio_url(lang, text)
    }

    /// Result of the most recent successful request, if any
    pub fn last_result(&self) -> Option<Arc<TranslationResult>> {
        self.lock().last_result.clone()
    }

    /// Error of the most recent failed request, if any
    pub fn last_error(&self) -> Option<TranslationError> {
        self.lock().last_error.clone()
    }

    /// Translate `text`, reusing the immediately preceding result when the
    /// request is identical.
    ///
    /// On success the result is stamped with vendor/request metadata, stored
    /// as the last result, and run through the auto-swap step. On failure the
    /// error is stored and re-raised.
    pub async fn get_translation(
        &self,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<Arc<TranslationResult>, TranslationError> {
        self.request(from.to_string(), to.to_string(), text.to_string())
            .await
    }

    // Boxed: auto-swap re-enters this for the nested request.
    fn request(
        &self,
        from: String,
        to: String,
        text: String,
    ) -> Pin<Box<dyn Future<Output = Result<Arc<TranslationResult>, TranslationError>> + Send + '_>>
    {
        Box::pin(async move {
            if let Some(last) = self.memoized(&from, &to, &text) {
                return Ok(last);
            }

            let info = self.vendor.info();
            let text = truncate(&text, info.text_max_length);

            self.lock().last_error = None;
            match self.vendor.translate(&from, &to, &text).await {
                Ok(mut result) => {
                    result.vendor = info.name.to_string();
                    result.original_text = text;
                    result.lang_from = from;
                    result.lang_to = to;

                    let result = Arc::new(result);
                    self.lock().last_result = Some(Arc::clone(&result));
                    Ok(self.auto_swap(result).await)
                }
                Err(error) => {
                    self.lock().last_error = Some(error.clone());
                    Err(error)
                }
            }
        })
    }

    fn memoized(&self, from: &str, to: &str, text: &str) -> Option<Arc<TranslationResult>> {
        let state = self.lock();
        let last = state.last_result.as_ref()?;
        (last.lang_from == from && last.lang_to == to && last.original_text == text)
            .then(|| Arc::clone(last))
    }

    /// Re-issue the request with swapped languages when the translation came
    /// back identical to the input, meaning the text was most likely already
    /// in the target language. Guarded so the nested request cannot swap
    /// again.
    async fn auto_swap(&self, result: Arc<TranslationResult>) -> Arc<TranslationResult> {
        let same_text = result.original_text.trim().to_lowercase()
            == result.translation.trim().to_lowercase();

        let fired = {
            let mut state = self.lock();
            if state.auto_swap_used || !same_text {
                false
            } else {
                state.auto_swap_used = true;
                true
            }
        };
        if !fired {
            return result;
        }

        let auto_detect = result.lang_from == "auto";
        let mut lang_to = result.lang_to.clone();
        if result.lang_detected.as_deref() == Some(lang_to.as_str()) {
            lang_to = if auto_detect {
                self.fallback_lang.clone()
            } else {
                result.lang_from.clone()
            };
        }
        let lang_from = result
            .lang_detected
            .clone()
            .unwrap_or_else(|| self.fallback_lang.clone());

        debug!(
            vendor = self.name(),
            from = %lang_from,
            to = %lang_to,
            "translation equals input, retrying with swapped languages"
        );
        let swapped = self
            .request(lang_from, lang_to, result.original_text.clone())
            .await;
        self.lock().auto_swap_used = false;

        match swapped {
            Ok(inner) => inner,
            Err(error) => {
                debug!(vendor = self.name(), error = %error, "auto-swap failed");
                result
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, RequestState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vendors::mock::{MockMode, MockVendor};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    fn suffix_translator() -> (Arc<MockVendor>, Translator) {
        let vendor = Arc::new(MockVendor::new(MockMode::Suffix));
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("en");
        (vendor, translator)
    }

    // ========== Memoization Tests ==========

    #[tokio::test]
    async fn test_identical_repeat_returns_memoized_arc() {
        let (vendor, translator) = suffix_translator();

        let first = translator.get_translation("en", "fr", "hello").await.unwrap();
        let second = translator.get_translation("en", "fr", "hello").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(vendor.calls(), 1);
    }

    #[tokio::test]
    async fn test_changed_request_bypasses_memo() {
        let (vendor, translator) = suffix_translator();

        translator.get_translation("en", "fr", "hello").await.unwrap();
        translator.get_translation("en", "de", "hello").await.unwrap();
        translator.get_translation("en", "de", "world").await.unwrap();

        assert_eq!(vendor.calls(), 3);
    }

    #[tokio::test]
    async fn test_in_flight_identical_requests_are_not_deduplicated() {
        let vendor = Arc::new(
            MockVendor::new(MockMode::Suffix).with_delay(std::time::Duration::from_millis(20)),
        );
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("en");

        // the memo only matches a *completed* preceding request
        let (first, second) = tokio::join!(
            translator.get_translation("en", "fr", "hello"),
            translator.get_translation("en", "fr", "hello"),
        );

        assert_eq!(vendor.calls(), 2);
        assert_eq!(first.unwrap().translation, "hello-fr");
        assert_eq!(second.unwrap().translation, "hello-fr");
    }

    #[tokio::test]
    async fn test_memo_only_remembers_the_immediately_preceding_request() {
        let (vendor, translator) = suffix_translator();

        translator.get_translation("en", "fr", "hello").await.unwrap();
        translator.get_translation("en", "de", "hello").await.unwrap();
        // "en"/"fr" was evicted by the "en"/"de" request
        translator.get_translation("en", "fr", "hello").await.unwrap();

        assert_eq!(vendor.calls(), 3);
    }

    // ========== Stamping & Truncation Tests ==========

    #[tokio::test]
    async fn test_result_is_stamped_with_request_metadata() {
        let (_, translator) = suffix_translator();

        let result = translator.get_translation("en", "fr", "hello").await.unwrap();

        assert_eq!(result.vendor, "mock");
        assert_eq!(result.original_text, "hello");
        assert_eq!(result.lang_from, "en");
        assert_eq!(result.lang_to, "fr");
        assert_eq!(result.translation, "hello-fr");
    }

    #[tokio::test]
    async fn test_text_is_truncated_to_vendor_limit() {
        let vendor = MockVendor::new(MockMode::Suffix).with_text_max_length(5);
        let translator = Translator::new(vendor).with_fallback_language("en");

        let result = translator
            .get_translation("en", "fr", "hello world")
            .await
            .unwrap();

        assert_eq!(result.original_text, "hello");
        assert_eq!(result.translation, "hello-fr");
    }

    // ========== Error Tests ==========

    #[tokio::test]
    async fn test_failure_is_recorded_and_reraised() {
        let translator = Translator::new(MockVendor::new(MockMode::Error("boom".into())))
            .with_fallback_language("en");

        let error = translator
            .get_translation("en", "fr", "hello")
            .await
            .unwrap_err();

        assert_eq!(error.status_text, "boom");
        assert_eq!(translator.last_error(), Some(error));
        assert!(translator.last_result().is_none());
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let vendor = Arc::new(MockVendor::new(MockMode::Suffix));
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("en");

        translator.lock().last_error = Some(TranslationError::network("mock://x", "old"));
        translator.get_translation("en", "fr", "hello").await.unwrap();

        assert!(translator.last_error().is_none());
    }

    // ========== Auto-Swap Tests ==========

    #[tokio::test]
    async fn test_auto_swap_fires_exactly_once_on_echoed_translation() {
        let vendor = Arc::new(
            MockVendor::new(MockMode::Echo).with_detected_language("en"),
        );
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("ru");

        let result = translator
            .get_translation("auto", "en", "hello")
            .await
            .unwrap();

        // one original request plus one swapped re-request, no recursion
        assert_eq!(vendor.calls(), 2);
        assert_eq!(result.lang_from, "en");
        assert_eq!(result.lang_to, "ru");
    }

    #[tokio::test]
    async fn test_auto_swap_uses_requested_source_when_not_auto() {
        let vendor = Arc::new(
            MockVendor::new(MockMode::Echo).with_detected_language("fr"),
        );
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("ru");

        let result = translator.get_translation("en", "fr", "salut").await.unwrap();

        // detected == target, explicit source: directions flip
        assert_eq!(vendor.calls(), 2);
        assert_eq!(result.lang_from, "fr");
        assert_eq!(result.lang_to, "en");
    }

    #[tokio::test]
    async fn test_auto_swap_guard_resets_between_requests() {
        let vendor = Arc::new(
            MockVendor::new(MockMode::Echo).with_detected_language("en"),
        );
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("ru");

        translator.get_translation("auto", "en", "first").await.unwrap();
        translator.get_translation("auto", "en", "second").await.unwrap();

        // both outer requests swapped once each
        assert_eq!(vendor.calls(), 4);
    }

    #[tokio::test]
    async fn test_no_swap_when_translation_differs() {
        let (vendor, translator) = suffix_translator();
        translator.get_translation("auto", "fr", "hello").await.unwrap();
        assert_eq!(vendor.calls(), 1);
    }

    #[tokio::test]
    async fn test_same_text_comparison_ignores_case_and_whitespace() {
        let vendor = Arc::new(
            MockVendor::new(MockMode::Echo).with_detected_language("en"),
        );
        let translator =
            Translator::from_arc(vendor.clone() as Arc<dyn Vendor>).with_fallback_language("ru");

        translator.get_translation("auto", "en", "  Hello ").await.unwrap();

        assert_eq!(vendor.calls(), 2);
    }

    /// Vendor that replays a scripted sequence of responses.
    struct SeqVendor {
        responses: Mutex<VecDeque<Result<TranslationResult, TranslationError>>>,
        languages: VendorLanguages,
    }

    #[async_trait]
    impl Vendor for SeqVendor {
        fn info(&self) -> VendorInfo {
            VendorInfo::new("seq", "Seq", "mock://seq", "mock://seq")
        }

        fn languages(&self) -> &VendorLanguages {
            &self.languages
        }

        async fn translate(
            &self,
            _from: &str,
            _to: &str,
            _text: &str,
        ) -> Result<TranslationResult, TranslationError> {
            self.state_pop()
        }
    }

    impl SeqVendor {
        fn new(responses: Vec<Result<TranslationResult, TranslationError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                languages: VendorLanguages::new(&[("auto", "Auto"), ("en", "English")]),
            }
        }

        fn state_pop(&self) -> Result<TranslationResult, TranslationError> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TranslationError::network("mock://seq", "exhausted")))
        }
    }

    #[tokio::test]
    async fn test_auto_swap_failure_returns_outer_result() {
        let echoed = TranslationResult {
            translation: "hello".into(),
            lang_detected: Some("en".into()),
            ..TranslationResult::default()
        };
        let vendor = SeqVendor::new(vec![
            Ok(echoed),
            Err(TranslationError::network("mock://seq", "swap refused")),
        ]);
        let translator = Translator::new(vendor).with_fallback_language("ru");

        let result = translator
            .get_translation("auto", "en", "hello")
            .await
            .unwrap();

        // the failed nested request did not poison the outer result
        assert_eq!(result.lang_from, "auto");
        assert_eq!(result.lang_to, "en");
        assert_eq!(result.translation, "hello");
    }

    // ========== Truncation Helper Tests ==========

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo wörld", 5), "héllo");
        assert_eq!(truncate("short", 100), "short");
    }
}
