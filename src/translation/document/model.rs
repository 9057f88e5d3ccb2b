/*!
 * String catalog (`.xcstrings`) model.
 *
 * Only the fields the pipeline reads or writes are typed. Everything else
 * (plural variations, substitutions, future keys) is kept in `extra` maps so
 * a parse/serialize cycle never drops data.
 */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::DocumentError;

/// Review state of a localized value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TranslationState {
    /// Translated and accepted
    Translated,
    /// Translated but flagged for a human to check
    NeedsReview,
    /// Created without a translation
    New,
    /// The source text changed after translation
    Stale,
    /// Any state this model does not know about, kept verbatim
    Other(String),
}

impl From<String> for TranslationState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "translated" => Self::Translated,
            "needs_review" => Self::NeedsReview,
            "new" => Self::New,
            "stale" => Self::Stale,
            _ => Self::Other(state),
        }
    }
}

impl From<TranslationState> for String {
    fn from(state: TranslationState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for TranslationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translated => write!(f, "translated"),
            Self::NeedsReview => write!(f, "needs_review"),
            Self::New => write!(f, "new"),
            Self::Stale => write!(f, "stale"),
            Self::Other(state) => write!(f, "{}", state),
        }
    }
}

/// A localized value and its review state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringUnit {
    /// Review state
    pub state: TranslationState,
    /// Localized text
    pub value: String,
}

/// One locale's entry for a key
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Localization {
    /// Plain value, absent for plural/device variations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_unit: Option<StringUnit>,

    /// Variations, substitutions and other untyped fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Localization {
    /// A plain value in the given state
    pub fn with_value(value: impl Into<String>, state: TranslationState) -> Self {
        Self {
            string_unit: Some(StringUnit {
                state,
                value: value.into(),
            }),
            extra: BTreeMap::new(),
        }
    }

    /// The plain value, if any
    pub fn value(&self) -> Option<&str> {
        self.string_unit.as_ref().map(|unit| unit.value.as_str())
    }
}

/// One key of the catalog
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringEntry {
    /// Developer comment for translators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// How the key was discovered (`manual`, `extracted_with_value`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_state: Option<String>,

    /// Localizations keyed by locale
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub localizations: BTreeMap<String, Localization>,

    /// `false` marks keys that must never be translated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_translate: Option<bool>,

    /// Untyped fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StringEntry {
    /// Whether the key is eligible for translation
    pub fn is_translatable(&self) -> bool {
        self.should_translate != Some(false)
    }

    /// Whether any localization exists for `locale`
    pub fn has_locale(&self, locale: &str) -> bool {
        self.localizations.contains_key(locale)
    }

    /// Text in the source locale, falling back to the key itself
    pub fn source_text<'a>(&'a self, key: &'a str, source_locale: &str) -> &'a str {
        self.localizations
            .get(source_locale)
            .and_then(Localization::value)
            .unwrap_or(key)
    }
}

/// A whole `.xcstrings` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringCatalog {
    /// Locale holding the source text
    #[serde(default)]
    pub source_language: String,

    /// Entries keyed by string key
    #[serde(default)]
    pub strings: BTreeMap<String, StringEntry>,

    /// Format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Untyped top-level fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl StringCatalog {
    /// Create an empty catalog
    pub fn new(source_language: impl Into<String>) -> Self {
        Self {
            source_language: source_language.into(),
            strings: BTreeMap::new(),
            version: Some("1.0".to_string()),
            extra: BTreeMap::new(),
        }
    }

    /// Parse a catalog, rejecting documents without a source language
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let catalog: Self = serde_json::from_str(json)?;
        if catalog.source_language.trim().is_empty() {
            return Err(DocumentError::MissingSourceLanguage);
        }
        Ok(catalog)
    }

    /// Serialize as pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add a key whose source-locale value is `text`
    pub fn insert_source(&mut self, key: impl Into<String>, text: impl Into<String>) -> &mut StringEntry {
        let source_language = self.source_language.clone();
        let entry = self.strings.entry(key.into()).or_default();
        entry
            .localizations
            .insert(source_language, Localization::with_value(text, TranslationState::Translated));
        entry
    }

    /// Number of keys with a localization for `locale`
    pub fn locale_coverage(&self, locale: &str) -> usize {
        self.strings.values().filter(|e| e.has_locale(locale)).count()
    }
}
