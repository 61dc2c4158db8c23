//! Translation request failures
//!
//! Vendors normalize every failure into [`TranslationError`]: the request
//! URL, the HTTP status, and whatever detail is available (raw body, parse
//! failure). Pure network errors that never produced a response carry status
//! code 0.

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// Structured failure of a vendor request, suitable for display
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranslationError {
    pub url: String,
    pub status_code: u16,
    pub status_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
}

impl TranslationError {
    /// Failure that never produced an HTTP response
    pub fn network(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            status_text: detail.into(),
            ..Self::default()
        }
    }
}

impl std::fmt::Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.status_code, self.status_text, self.url)?;
        if let Some(parse_error) = &self.parse_error {
            write!(f, ": {}", parse_error)?;
        }
        Ok(())
    }
}

impl std::error::Error for TranslationError {}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            status_code: err.status().map(|s| s.as_u16()).unwrap_or(0),
            status_text: err.to_string(),
            ..Self::default()
        }
    }
}

/// Read a response body as JSON, normalizing failures.
///
/// A non-success status becomes an error carrying the raw body; a success
/// status with a malformed body becomes an error carrying the parse detail.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, TranslationError> {
    let url = response.url().to_string();
    let status = response.status();
    let mut error = TranslationError {
        url,
        status_code: status.as_u16(),
        status_text: status
            .canonical_reason()
            .unwrap_or_else(|| status.as_str())
            .to_string(),
        ..TranslationError::default()
    };

    let text = match response.text().await {
        Ok(text) => text,
        Err(err) => {
            error.parse_error = Some(err.to_string());
            return Err(error);
        }
    };
    error.response_text = Some(text.clone());

    match serde_json::from_str(&text) {
        Ok(parsed) if status.is_success() => Ok(parsed),
        Ok(_) => Err(error),
        Err(err) => {
            if status.is_success() {
                error.parse_error = Some(err.to_string());
            }
            Err(error)
        }
    }
}
