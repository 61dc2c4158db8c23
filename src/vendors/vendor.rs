//! Vendor capability interface
//!
//! This module defines the [`Vendor`] trait every translation service
//! integration implements, enabling support for different backends (Bing,
//! Google, mock, ...) without coupling the core to any specific one.
//!
//! A vendor is a *leaf* adapter: it declares its capabilities (languages,
//! text limits) and turns one `(from, to, text)` request into a normalized
//! [`TranslationResult`]. Everything cross-cutting (memoization, metadata
//! stamping, auto-swap) lives in
//! [`Translator`](crate::vendors::Translator), which wraps a vendor.

use crate::vendors::error::TranslationError;
use crate::vendors::result::TranslationResult;
use async_trait::async_trait;

/// Default cap for URL-building vendors (GET endpoints, audio URLs)
pub const DEFAULT_URL_MAX_LENGTH: usize = 2048;

/// Static descriptor of a vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorInfo {
    /// Code name, e.g. "bing"
    pub name: &'static str,
    /// Human readable name, e.g. "Bing"
    pub title: &'static str,
    /// Endpoint base the adapter talks to
    pub api_url: &'static str,
    /// User-facing page of the service
    pub public_url: &'static str,
    /// Requests are truncated to this many characters
    pub text_max_length: usize,
    /// Cap for URLs the vendor builds (GET requests, audio)
    pub url_max_length: usize,
}

impl VendorInfo {
    pub fn new(
        name: &'static str,
        title: &'static str,
        api_url: &'static str,
        public_url: &'static str,
    ) -> Self {
        Self {
            name,
            title,
            api_url,
            public_url,
            text_max_length: usize::MAX,
            url_max_length: DEFAULT_URL_MAX_LENGTH,
        }
    }

    pub fn text_max_length(mut self, limit: usize) -> Self {
        self.text_max_length = limit;
        self
    }
}

/// Language table entry: `(code, english title)`
pub type LanguageEntry = (&'static str, &'static str);

/// Supported languages of one vendor
///
/// The source table may contain `"auto"` for vendors that detect the input
/// language. When no explicit target table is given, targets are the sources
/// minus `"auto"`.
#[derive(Debug, Clone, Copy)]
pub struct VendorLanguages {
    from: &'static [LanguageEntry],
    to: Option<&'static [LanguageEntry]>,
}

impl VendorLanguages {
    pub const fn new(from: &'static [LanguageEntry]) -> Self {
        Self { from, to: None }
    }

    pub const fn with_targets(from: &'static [LanguageEntry], to: &'static [LanguageEntry]) -> Self {
        Self { from, to: Some(to) }
    }

    /// Source languages, including `"auto"` when supported
    pub fn sources(&self) -> impl Iterator<Item = LanguageEntry> + '_ {
        self.from.iter().copied()
    }

    /// Target languages (never contains `"auto"`)
    pub fn targets(&self) -> impl Iterator<Item = LanguageEntry> + '_ {
        self.to
            .unwrap_or(self.from)
            .iter()
            .copied()
            .filter(|(code, _)| *code != "auto")
    }

    pub fn has_source(&self, code: &str) -> bool {
        self.sources().any(|(c, _)| c == code)
    }

    pub fn has_target(&self, code: &str) -> bool {
        self.targets().any(|(c, _)| c == code)
    }
}

/// Generic trait for translation service integrations
///
/// All request methods are async to support network I/O. Implementations
/// return results with only the vendor-specific fields filled in
/// (`translation`, `lang_detected`, `transcription`, `dictionary`); the
/// wrapping [`Translator`](crate::vendors::Translator) stamps request
/// metadata afterwards.
#[async_trait]
pub trait Vendor: Send + Sync {
    /// Static descriptor (name, URLs, limits)
    fn info(&self) -> VendorInfo;

    /// Supported language pairs
    fn languages(&self) -> &VendorLanguages;

    /// Translate `text` from `from` to `to`
    ///
    /// `from` may be `"auto"` when the vendor's source table declares it.
    async fn translate(
        &self,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<TranslationResult, TranslationError>;

    /// URL of a text-to-speech rendition of `text`, when the vendor has one
    fn audio_url(&self, _lang: &str, _text: &str) -> Option<String> {
        None
    }

    /// Whether both language codes are declared by this vendor
    fn can_translate(&self, from: &str, to: &str) -> bool {
        self.languages().has_source(from) && self.languages().has_target(to)
    }
}
