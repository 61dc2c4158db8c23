//! Bing Translator adapter
//!
//! Bing's web endpoints are keyless but guarded by per-session parameters
//! (`key`, `token`, `IG`, `IID`) embedded in the translator page. The
//! adapter scrapes them once, caches them through a [`StorageHelper`] under
//! the `bing_api_global_params` key, and refreshes them lazily when they are
//! missing or expired. A rejected token triggers one refresh-and-retry;
//! callers never see the staleness.
//!
//! Concurrent cold starts may refresh twice: the cache is not mutually
//! excluded, and the second refresh simply overwrites the first.

use crate::storage::{StorageAdapter, StorageHelper, StorageOptions};
use crate::vendors::error::{TranslationError, read_json};
use crate::vendors::http_client;
use crate::vendors::languages::BING_LANGUAGES;
use crate::vendors::result::{DictionaryGroup, DictionaryMeaning, TranslationResult};
use crate::vendors::vendor::{Vendor, VendorInfo, VendorLanguages};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

const API_URL: &str = "https://www.bing.com";
const PUBLIC_URL: &str = "https://www.bing.com/translator";
const PARAMS_STORAGE_KEY: &str = "bing_api_global_params";

static LANGUAGES: VendorLanguages = VendorLanguages::new(BING_LANGUAGES);

/// Session parameters scraped from the Bing translator page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BingGlobalParams {
    pub key: String,
    pub token: String,
    #[serde(rename = "IG")]
    pub ig: String,
    #[serde(rename = "IID")]
    pub iid: String,
    #[serde(rename = "isVertical")]
    pub is_vertical: bool,
    /// Unix milliseconds after which the token is no longer accepted
    #[serde(rename = "tokenExpiryTime")]
    pub token_expiry_time: u64,
}

impl BingGlobalParams {
    fn is_expired(&self, now_ms: u64) -> bool {
        self.token_expiry_time < now_ms
    }
}

pub struct Bing {
    client: reqwest::Client,
    global_params: StorageHelper<BingGlobalParams>,
}

impl Bing {
    /// Create the adapter; `auth_storage` persists the scraped session
    /// parameters across runs
    pub fn new(auth_storage: impl StorageAdapter + 'static) -> Self {
        Self {
            client: http_client(),
            global_params: StorageHelper::new(
                PARAMS_STORAGE_KEY,
                auth_storage,
                StorageOptions::new(BingGlobalParams::default()),
            ),
        }
    }

    async fn ensure_params(&self) -> BingGlobalParams {
        if !self.global_params.is_loaded() {
            self.global_params.load().await;
        }

        let params = self.global_params.get();
        if self.global_params.is_default(&params) || params.is_expired(now_ms()) {
            self.refresh_params().await;
        }

        self.global_params.get()
    }

    /// Re-scrape the translator page; failures are logged and absorbed, the
    /// next request will surface its own error
    async fn refresh_params(&self) {
        match self.fetch_params().await {
            Ok(Some(params)) => {
                debug!(expiry = params.token_expiry_time, "bing auth params updated");
                self.global_params.set(params).await;
            }
            Ok(None) => warn!("bing auth params not found in translator page"),
            Err(err) => warn!(error = %err, "bing auth params refresh failed"),
        }
    }

    async fn fetch_params(&self) -> Result<Option<BingGlobalParams>, TranslationError> {
        let response = self.client.get(PUBLIC_URL).send().await?;
        let html = response.text().await.map_err(TranslationError::from)?;
        Ok(parse_global_params(&html))
    }

    async fn translation_request(
        &self,
        params: &BingGlobalParams,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<Vec<BingTranslation>, TranslationError> {
        let url = format!(
            "{}/ttranslatev3?IG={}&IID={}&isVertical={}",
            API_URL,
            params.ig,
            params.iid,
            u8::from(params.is_vertical),
        );
        let response = self
            .client
            .post(&url)
            .form(&[
                ("fromLang", from),
                ("to", to),
                ("text", text),
                ("key", &params.key),
                ("token", &params.token),
            ])
            .send()
            .await?;
        read_json(response).await
    }

    async fn dictionary_request(
        &self,
        params: &BingGlobalParams,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<Vec<DictionaryGroup>, TranslationError> {
        let url = format!(
            "{}/tlookupv3?IG={}&IID={}",
            API_URL, params.ig, params.iid,
        );
        let response = self
            .client
            .post(&url)
            .form(&[
                ("from", from),
                ("to", to),
                ("text", text),
                ("key", &params.key),
                ("token", &params.token),
            ])
            .send()
            .await?;
        let lookups: Vec<BingDictionary> = read_json(response).await?;
        Ok(group_dictionary(lookups))
    }
}

#[async_trait]
impl Vendor for Bing {
    fn info(&self) -> VendorInfo {
        VendorInfo::new("bing", "Bing", API_URL, PUBLIC_URL).text_max_length(1000)
    }

    fn languages(&self) -> &VendorLanguages {
        &LANGUAGES
    }

    async fn translate(
        &self,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<TranslationResult, TranslationError> {
        let mut params = self.ensure_params().await;
        let from_lang = if from == "auto" { "auto-detect" } else { from };

        let mut response = self.translation_request(&params, from_lang, to, text).await;
        if let Err(error) = &response
            && is_stale_auth(error)
        {
            debug!("bing token rejected, refreshing auth params");
            self.refresh_params().await;
            params = self.global_params.get();
            response = self.translation_request(&params, from_lang, to, text).await;
        }

        let first = response?.into_iter().next().ok_or_else(|| TranslationError {
            url: format!("{}/ttranslatev3", API_URL),
            status_code: 200,
            status_text: "OK".into(),
            parse_error: Some("empty translation response".into()),
            ..TranslationError::default()
        })?;

        let lang_detected = first.detected_language.language;
        let (translation, transcription) = match first.translations.into_iter().next() {
            Some(item) => (item.text, item.transliteration.and_then(|t| t.text)),
            None => (String::new(), None),
        };

        // best effort: a failed lookup must not fail the translation
        let dictionary = match self
            .dictionary_request(&params, &lang_detected, to, text)
            .await
        {
            Ok(dictionary) => dictionary,
            Err(err) => {
                debug!(error = %err, "bing dictionary lookup failed");
                Vec::new()
            }
        };

        Ok(TranslationResult {
            lang_detected: Some(lang_detected),
            translation,
            transcription,
            dictionary,
            ..TranslationResult::default()
        })
    }
}

/// A rejected token comes back either as HTTP 400 or as a 200 whose body
/// smuggles the status
fn is_stale_auth(error: &TranslationError) -> bool {
    error.status_code == 400
        || error
            .response_text
            .as_deref()
            .is_some_and(|body| body.contains("\"statusCode\":400"))
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn rich_params_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"params_RichTranslateHelper\s*=\s*\[(\d+),"(.*?)",(\d+),(true|false),"#)
            .expect("static pattern")
    })
}

fn ig_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"IG:"([^"]+)""#).expect("static pattern"))
}

fn iid_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"data-iid="([^"]+)""#).expect("static pattern"))
}

/// Extract the session parameters from the translator page HTML
fn parse_global_params(html: &str) -> Option<BingGlobalParams> {
    let captures = rich_params_re().captures(html)?;
    let key = captures.get(1)?.as_str().to_string();
    let token = captures.get(2)?.as_str().to_string();
    let expiry_timeout: u64 = captures.get(3)?.as_str().parse().ok()?;
    let is_vertical: bool = captures.get(4)?.as_str().parse().ok()?;

    let ig = ig_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let iid = iid_re()
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    // the key doubles as the issue timestamp
    let issued_ms: u64 = key.parse().ok()?;
    Some(BingGlobalParams {
        token_expiry_time: issued_ms + expiry_timeout,
        key,
        token,
        ig,
        iid,
        is_vertical,
    })
}

fn group_dictionary(lookups: Vec<BingDictionary>) -> Vec<DictionaryGroup> {
    let mut groups: Vec<DictionaryGroup> = Vec::new();
    let Some(first) = lookups.into_iter().next() else {
        return groups;
    };

    for entry in first.translations {
        let word_type = entry.pos_tag.to_lowercase();
        let meaning = DictionaryMeaning {
            word: entry.display_target,
            translation: entry
                .back_translations
                .into_iter()
                .map(|back| back.display_text)
                .collect(),
        };
        match groups.iter_mut().find(|group| group.word_type == word_type) {
            Some(group) => group.meanings.push(meaning),
            None => groups.push(DictionaryGroup {
                word_type,
                meanings: vec![meaning],
            }),
        }
    }

    groups
}

// ─── Wire shapes ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingTranslation {
    detected_language: BingDetectedLanguage,
    #[serde(default)]
    translations: Vec<BingTranslationItem>,
}

#[derive(Debug, Deserialize)]
struct BingDetectedLanguage {
    language: String,
}

#[derive(Debug, Deserialize)]
struct BingTranslationItem {
    text: String,
    #[serde(default)]
    transliteration: Option<BingTransliteration>,
}

#[derive(Debug, Default, Deserialize)]
struct BingTransliteration {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BingDictionary {
    translations: Vec<BingDictEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingDictEntry {
    pos_tag: String,
    display_target: String,
    #[serde(default)]
    back_translations: Vec<BingBackTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingBackTranslation {
    display_text: String,
}
