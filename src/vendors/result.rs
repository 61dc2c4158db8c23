//! Normalized translation results
//!
//! Every vendor response is reduced to the same [`TranslationResult`] shape
//! before it reaches a consumer. Results are immutable once returned: the
//! translator hands out `Arc<TranslationResult>` and equality is structural.

use serde::{Deserialize, Serialize};

/// A normalized translation produced by one vendor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationResult {
    /// Code name of the vendor that produced the result, e.g. "bing"
    pub vendor: String,
    /// The (possibly truncated) text that was sent for translation
    pub original_text: String,
    /// Requested source language ("auto" allowed)
    pub lang_from: String,
    /// Requested target language
    pub lang_to: String,
    /// Source language the vendor detected, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang_detected: Option<String>,
    pub translation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spell_correction: Option<String>,
    /// Dictionary entries grouped by word type, in vendor order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dictionary: Vec<DictionaryGroup>,
}

/// Dictionary entries of one word type ("noun", "verb", ...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DictionaryGroup {
    pub word_type: String,
    pub meanings: Vec<DictionaryMeaning>,
}

/// One alternative meaning with its back-translations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DictionaryMeaning {
    pub word: String,
    pub translation: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape_is_camel_case() {
        let result = TranslationResult {
            vendor: "bing".into(),
            original_text: "hello".into(),
            lang_from: "en".into(),
            lang_to: "fr".into(),
            lang_detected: Some("en".into()),
            translation: "bonjour".into(),
            ..TranslationResult::default()
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["originalText"], "hello");
        assert_eq!(json["langDetected"], "en");
        // empty optionals stay off the wire
        assert!(json.get("transcription").is_none());
        assert!(json.get("dictionary").is_none());
    }

    #[test]
    fn test_equality_is_structural() {
        let a = TranslationResult {
            translation: "bonjour".into(),
            ..TranslationResult::default()
        };
        let b = a.clone();
        assert_eq!(a, b);
    }
}
