/*!
 * Format specifier scanning.
 *
 * Store strings carry printf-style placeholders (`%@`, `%d`, `%1$@`, `%.2f`,
 * `%lld`) that the app substitutes at runtime. Every translation must keep
 * them verbatim and in the same order, so the scanner is used both to tell
 * the model what to preserve and to check what came back.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Regex matching format specifiers, with `%%` matched first so escaped
/// percent signs are consumed and never reported
static FORMAT_SPECIFIER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%%|%[@dislf0-9.$+\-#]*[dislf@]|%[0-9]+\$[@dislf]|%\.[0-9]f")
        .expect("Invalid format specifier regex")
});

/// Extract format specifiers from `text`, in left-to-right order
pub fn scan(text: &str) -> Vec<String> {
    FORMAT_SPECIFIER_REGEX
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|token| *token != "%%")
        .map(str::to_string)
        .collect()
}

/// Whether `candidate` carries exactly the source's token sequence
///
/// A source without tokens constrains nothing, so any candidate matches even
/// when it happens to contain a `%` sequence such as German "50%ige".
pub fn placeholders_match(source_tokens: &[String], candidate: &str) -> bool {
    source_tokens.is_empty() || scan(candidate) == source_tokens
}
