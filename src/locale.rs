//! System language detection
//!
//! The auto-swap heuristic needs a "language the user reads" fallback when a
//! vendor cannot tell us anything better. On the web that is
//! `navigator.language`; here it comes from the locale environment variables.

use std::env;

/// Detect the system language code (e.g. "de", "en").
///
/// Checks `LC_ALL`, `LC_MESSAGES` and `LANG` in priority order and keeps only
/// the language part of the locale string ("de_DE.UTF-8" → "de"). Falls back
/// to `"en"` when nothing usable is set.
pub fn system_language() -> String {
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = env::var(var)
            && let Some(lang) = parse_language(&value)
        {
            return lang;
        }
    }

    "en".to_string()
}

/// Extract the language code from a locale string like "de_DE.UTF-8",
/// "en-US" or "fr".
fn parse_language(locale: &str) -> Option<String> {
    let trimmed = locale.trim();
    if trimmed.is_empty() || trimmed == "C" || trimmed == "POSIX" {
        return None;
    }

    // Strip the encoding suffix, then the region/script part
    let no_encoding = trimmed.split('.').next()?;
    let language = no_encoding.split(['_', '-']).next()?;

    if language.is_empty() || !language.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    Some(language.to_lowercase())
}
