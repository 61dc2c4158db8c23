//! Google Translate adapter
//!
//! Uses the keyless `client=gtx` web endpoint rather than the billed Cloud
//! API. With `dj=1` the endpoint answers structured JSON: `sentences` carry
//! the translation and transliteration, `dict` the per-word-type
//! alternatives, `src` the detected language and `spell` a suggested
//! correction.

use crate::vendors::error::{TranslationError, read_json};
use crate::vendors::http_client;
use crate::vendors::languages::GOOGLE_LANGUAGES;
use crate::vendors::result::{DictionaryGroup, DictionaryMeaning, TranslationResult};
use crate::vendors::vendor::{Vendor, VendorInfo, VendorLanguages};
use async_trait::async_trait;
use serde::Deserialize;

const API_URL: &str = "https://translate.googleapis.com";
const PUBLIC_URL: &str = "https://translate.google.com";

static LANGUAGES: VendorLanguages = VendorLanguages::new(GOOGLE_LANGUAGES);

#[derive(Default)]
pub struct Google {
    client: reqwest::Client,
}

impl Google {
    pub fn new() -> Self {
        Self {
            client: http_client(),
        }
    }
}

#[async_trait]
impl Vendor for Google {
    fn info(&self) -> VendorInfo {
        VendorInfo::new("google", "Google", API_URL, PUBLIC_URL).text_max_length(5000)
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
        let response = self
            .client
            .get(format!("{}/translate_a/single", API_URL))
            .query(&[
                ("client", "gtx"),
                ("dj", "1"),
                ("source", "input"),
                ("sl", from),
                ("tl", to),
                ("hl", to),
                ("dt", "t"),
                ("dt", "bd"),
                ("dt", "rm"),
                ("dt", "qca"),
                ("q", text),
            ])
            .send()
            .await?;

        let data: GoogleResponse = read_json(response).await?;
        Ok(normalize(data))
    }

    fn audio_url(&self, lang: &str, text: &str) -> Option<String> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/translate_tts", API_URL),
            &[("client", "gtx"), ("ie", "UTF-8"), ("tl", lang), ("q", text)],
        )
        .ok()?
        .to_string();

        (url.len() <= self.info().url_max_length).then_some(url)
    }
}

fn normalize(data: GoogleResponse) -> TranslationResult {
    let mut translation = String::new();
    let mut transcription = None;
    for sentence in data.sentences {
        if let Some(trans) = sentence.trans {
            translation.push_str(&trans);
        }
        // the transliteration rides on a trailing pseudo-sentence
        if let Some(translit) = sentence.translit
            && !translit.is_empty()
        {
            transcription = Some(translit);
        }
    }

    let dictionary = data
        .dict
        .into_iter()
        .map(|entry| DictionaryGroup {
            word_type: entry.pos,
            meanings: entry
                .entry
                .into_iter()
                .map(|meaning| DictionaryMeaning {
                    word: meaning.word,
                    translation: meaning.reverse_translation,
                })
                .collect(),
        })
        .collect();

    TranslationResult {
        lang_detected: data.src.filter(|src| !src.is_empty()),
        translation,
        transcription,
        spell_correction: data.spell.spell_res.filter(|s| !s.is_empty()),
        dictionary,
        ..TranslationResult::default()
    }
}

// ─── Wire shapes ─────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleResponse {
    sentences: Vec<GoogleSentence>,
    dict: Vec<GoogleDictEntry>,
    src: Option<String>,
    spell: GoogleSpell,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleSentence {
    trans: Option<String>,
    translit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleDictEntry {
    pos: String,
    entry: Vec<GoogleDictMeaning>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleDictMeaning {
    word: String,
    reverse_translation: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GoogleSpell {
    spell_res: Option<String>,
}
