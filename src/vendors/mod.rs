/// Translation Vendors Module
///
/// Everything between a consumer and the web translation services:
///
/// 1. **Vendor trait** - capability interface each service integration
///    implements (languages, limits, `translate`, optional audio URL)
/// 2. **Translator** - stateful wrapper adding memoization, metadata
///    stamping and the automatic language-swap heuristic
/// 3. **Registry** - insertion-ordered vendor collection with wrap-around
///    "next vendor" rotation
/// 4. **Adapters** - Bing (scraped session auth), Google (keyless gtx
///    endpoint) and a deterministic mock
///
/// # Example
///
/// ```ignore
/// let mut registry = TranslatorRegistry::with_default_vendors(MemoryStorage::new());
/// let translator = registry.get("google").unwrap();
/// let result = translator.get_translation("auto", "fr", "hello world").await?;
/// println!("{}", result.translation);
/// ```
pub mod bing;
pub mod error;
pub mod google;
pub mod languages;
pub mod mock;
pub mod registry;
pub mod result;
pub mod translator;
pub mod vendor;

#[cfg(test)]
mod integration_tests;

pub use bing::{Bing, BingGlobalParams};
pub use error::TranslationError;
pub use google::Google;
pub use mock::{MockMode, MockVendor};
pub use registry::TranslatorRegistry;
pub use result::{DictionaryGroup, DictionaryMeaning, TranslationResult};
pub use translator::Translator;
pub use vendor::{LanguageEntry, Vendor, VendorInfo, VendorLanguages};

use std::time::Duration;

/// Browser-ish identity; some endpoints answer differently to the default
/// library User-Agent
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Shared HTTP client configuration for the web vendors
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
