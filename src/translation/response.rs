/*!
 * Parsing of provider replies.
 *
 * Models often wrap JSON in Markdown code fences or return slightly
 * different shapes than requested. Parsing tolerates that noise but fails
 * closed with `MalformedResponse` when no usable JSON object remains.
 */

use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::errors::TranslationError;

/// Translations of one text, keyed by locale
pub type LocaleTranslations = BTreeMap<String, String>;

/// Parsed reply to a batch prompt
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResponse {
    /// One entry per requested index; empty when the index was absent
    pub entries: Vec<LocaleTranslations>,
    /// Indices the reply did not mention at all
    pub missing_indices: Vec<usize>,
}

impl BatchResponse {
    /// Whether the reply covered `index`
    pub fn is_missing(&self, index: usize) -> bool {
        self.missing_indices.contains(&index)
    }
}

/// Remove a surrounding Markdown code fence, with or without a language tag
pub fn strip_code_fences(raw: &str) -> &str {
    let mut content = raw.trim();

    if let Some(rest) = content.strip_prefix("```") {
        // Drop an info string such as `json` up to the end of the fence line
        content = match rest.find('\n') {
            Some(newline) if rest[..newline].trim().chars().all(|c| c.is_ascii_alphanumeric()) => {
                &rest[newline + 1..]
            }
            _ => rest.strip_prefix("json").unwrap_or(rest),
        };
    }
    if let Some(rest) = content.trim_end().strip_suffix("```") {
        content = rest;
    }

    content.trim()
}

fn parse_json(raw: &str) -> Result<Value, TranslationError> {
    let content = strip_code_fences(raw);
    serde_json::from_str(content).map_err(|e| {
        let preview: String = content.chars().take(120).collect();
        TranslationError::MalformedResponse(format!("{} in: {}", e, preview))
    })
}

/// Keep only string values, edge whitespace included
fn locale_map(value: Option<&Value>) -> LocaleTranslations {
    value
        .and_then(Value::as_object)
        .map(|object| {
            object
                .iter()
                .filter_map(|(locale, text)| {
                    text.as_str().map(|t| (locale.clone(), t.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse the reply to a single-text prompt
///
/// A reply without a `translations` object yields an empty map.
pub fn parse_single(raw: &str) -> Result<LocaleTranslations, TranslationError> {
    match parse_json(raw)? {
        Value::Object(object) => Ok(locale_map(object.get("translations"))),
        other => Err(TranslationError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Parse the reply to a batch prompt of `expected_count` items
///
/// Accepts an object keyed by stringified index or a JSON array in index
/// order. Indices the reply does not mention map to empty translations and
/// are reported in `missing_indices`.
pub fn parse_batch(raw: &str, expected_count: usize) -> Result<BatchResponse, TranslationError> {
    let value = parse_json(raw)?;
    if !value.is_object() && !value.is_array() {
        return Err(TranslationError::MalformedResponse(format!(
            "expected a JSON object keyed by index, got {}",
            json_kind(&value)
        )));
    }

    let mut response = BatchResponse::default();
    for index in 0..expected_count {
        match entry_at(&value, index) {
            Some(entry) if !entry.is_null() => response.entries.push(locale_map(Some(entry))),
            _ => {
                response.entries.push(LocaleTranslations::new());
                response.missing_indices.push(index);
            }
        }
    }

    Ok(response)
}

fn entry_at(value: &Value, index: usize) -> Option<&Value> {
    match value {
        Value::Object(object) => lookup_index(object, index),
        Value::Array(items) => items.get(index),
        _ => None,
    }
}

/// Find an index key, tolerating `"[0]"` style keys some models echo back
fn lookup_index(object: &Map<String, Value>, index: usize) -> Option<&Value> {
    object
        .get(&index.to_string())
        .or_else(|| object.get(&format!("[{}]", index)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
