//! Locale utilities for store localizations
//!
//! Store catalogs use BCP-47 style identifiers (`fr`, `pt-BR`, `zh-Hans`).
//! This module knows the locales the app stores accept, gives them
//! human-readable names for prompts, and falls back to ISO 639 data for
//! anything else.

use anyhow::{Result, anyhow};
use isolang::Language;

/// A locale the pipeline can target out of the box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupportedLocale {
    /// Locale identifier as written in catalogs
    pub code: &'static str,
    /// Short name shown in listings
    pub name: &'static str,
    /// Name given to the model, disambiguating script and region
    pub prompt_name: &'static str,
}

/// Locales offered by default, in display order
pub const SUPPORTED_LOCALES: &[SupportedLocale] = &[
    SupportedLocale { code: "fr", name: "French", prompt_name: "French" },
    SupportedLocale { code: "es", name: "Spanish", prompt_name: "Spanish" },
    SupportedLocale { code: "de", name: "German", prompt_name: "German" },
    SupportedLocale { code: "ja", name: "Japanese", prompt_name: "Japanese" },
    SupportedLocale { code: "ko", name: "Korean", prompt_name: "Korean" },
    SupportedLocale { code: "zh-HK", name: "Chinese (HK)", prompt_name: "Traditional Chinese (Hong Kong)" },
    SupportedLocale { code: "zh-Hans", name: "Chinese (Simplified)", prompt_name: "Simplified Chinese" },
    SupportedLocale { code: "ar", name: "Arabic", prompt_name: "Arabic" },
    SupportedLocale { code: "tr", name: "Turkish", prompt_name: "Turkish" },
    SupportedLocale { code: "id", name: "Indonesian", prompt_name: "Indonesian" },
    SupportedLocale { code: "pt-BR", name: "Portuguese (BR)", prompt_name: "Portuguese (Brazilian)" },
    SupportedLocale { code: "it", name: "Italian", prompt_name: "Italian" },
    SupportedLocale { code: "ru", name: "Russian", prompt_name: "Russian" },
    SupportedLocale { code: "nl", name: "Dutch", prompt_name: "Dutch" },
    SupportedLocale { code: "pl", name: "Polish", prompt_name: "Polish" },
    SupportedLocale { code: "th", name: "Thai", prompt_name: "Thai" },
    SupportedLocale { code: "vi", name: "Vietnamese", prompt_name: "Vietnamese" },
    SupportedLocale { code: "hi", name: "Hindi", prompt_name: "Hindi" },
    SupportedLocale { code: "sv", name: "Swedish", prompt_name: "Swedish" },
    SupportedLocale { code: "da", name: "Danish", prompt_name: "Danish" },
];

/// Find a locale in the supported table (case-insensitive)
pub fn find_supported(code: &str) -> Option<&'static SupportedLocale> {
    let code = code.trim();
    SUPPORTED_LOCALES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

/// Language subtag of a locale identifier (`pt-BR` -> `pt`, `zh_Hans` -> `zh`)
pub fn primary_subtag(code: &str) -> &str {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
}

/// Resolve an ISO 639-1 or 639-3 language subtag
fn iso_language(subtag: &str) -> Option<Language> {
    let subtag = subtag.to_lowercase();
    match subtag.len() {
        2 => Language::from_639_1(&subtag),
        3 => Language::from_639_3(&subtag),
        _ => None,
    }
}

/// Validate that a locale identifier names a real language
pub fn validate_locale(code: &str) -> Result<()> {
    if find_supported(code).is_some() || iso_language(primary_subtag(code)).is_some() {
        Ok(())
    } else {
        Err(anyhow!("Invalid locale code: {}", code))
    }
}

/// Get the name of a locale as it should appear in a prompt
///
/// Unknown codes are returned unchanged so prompts stay usable.
pub fn prompt_name(code: &str) -> String {
    if let Some(locale) = find_supported(code) {
        return locale.prompt_name.to_string();
    }

    iso_language(primary_subtag(code))
        .map(|lang| lang.to_name().to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Render a locale as `code (Name)`, the form used in prompts
pub fn describe_locale(code: &str) -> String {
    format!("{} ({})", code, prompt_name(code))
}

/// Check if two locale identifiers refer to the same locale
pub fn locale_codes_match(code1: &str, code2: &str) -> bool {
    let normalize = |c: &str| c.trim().replace('_', "-").to_lowercase();
    normalize(code1) == normalize(code2)
}
