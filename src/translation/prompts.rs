/*!
 * Prompt construction for single-text and batch translation requests.
 *
 * Both prompts ask for a bare JSON object, spell out the placeholder rules,
 * and list protected words that must be echoed untranslated. Batch prompts
 * address each text by its position in the batch.
 */

use crate::language_utils;

use super::placeholders;

/// System and user message pair sent to a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions for the model
    pub system_message: String,
    /// The request itself
    pub user_message: String,
}

impl Prompt {
    /// Create a new prompt
    pub fn new(system_message: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            system_message: system_message.into(),
            user_message: user_message.into(),
        }
    }
}

/// One source text inside a batch prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptItem<'a> {
    /// Source text
    pub text: &'a str,
    /// Format specifiers scanned from the text
    pub placeholders: &'a [String],
}

/// Builder for translation prompts
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    source_language: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new("en")
    }
}

impl PromptBuilder {
    /// Create a builder for texts written in `source_locale`
    pub fn new(source_locale: &str) -> Self {
        Self {
            source_language: language_utils::prompt_name(source_locale),
        }
    }

    /// Prompt for one text translated into every target locale
    ///
    /// Expected reply: `{"translations": {"<locale>": "<text>", ...}}`.
    pub fn build_single(
        &self,
        text: &str,
        target_locales: &[String],
        protected_words: &[String],
    ) -> Prompt {
        let tokens = placeholders::scan(text);
        let protected = protected_list(protected_words);

        let mut system_message = self.rules_preamble("Translate {source} text to multiple languages.", protected.as_deref());
        system_message.push_str(&format!(
            "\n{}. Your output must be ONLY a JSON object with this structure:\n{{\n  \"translations\": {{\n    \"fr\": \"French translation here\",\n    \"es\": \"Spanish translation here\"\n  }}\n}}",
            next_rule_number(protected.is_some())
        ));

        let mut user_message = format!(
            "Translate this {} text to the following languages: {}\n\n{} text: {}\n",
            self.source_language,
            locale_list(target_locales),
            self.source_language,
            quote(text)
        );
        if !tokens.is_empty() {
            user_message.push_str(&format!(
                "\nFormat specifiers that MUST be preserved exactly: {}",
                tokens.join(", ")
            ));
        }
        if let Some(protected) = &protected {
            user_message.push_str(&format!(
                "\nProtected words that MUST NOT be translated (keep as-is): {}",
                protected
            ));
        }
        user_message.push_str(&format!(
            "\n\nRespond with ONLY a JSON object containing translations for ALL {} requested languages.",
            target_locales.len()
        ));

        Prompt::new(system_message, user_message)
    }

    /// Prompt for several texts translated in one call
    ///
    /// Expected reply: `{"0": {"<locale>": "<text>"}, "1": {...}}`, one key
    /// per item index.
    pub fn build_batch(
        &self,
        items: &[PromptItem<'_>],
        target_locales: &[String],
        protected_words: &[String],
    ) -> Prompt {
        let protected = protected_list(protected_words);

        let mut system_message = self.rules_preamble("Translate multiple {source} texts to multiple languages.", protected.as_deref());
        system_message.push_str(&format!(
            "\n{}. Your output must be ONLY a JSON object with translations for each text ID.",
            next_rule_number(protected.is_some())
        ));

        let texts = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                if item.placeholders.is_empty() {
                    format!("[{}] {}", index, quote(item.text))
                } else {
                    format!(
                        "[{}] {} (preserve: {})",
                        index,
                        quote(item.text),
                        item.placeholders.join(", ")
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n");

        let example_locales = target_locales
            .iter()
            .take(2)
            .map(|l| format!("\"{}\": \"...\"", l))
            .collect::<Vec<_>>()
            .join(", ");

        let mut user_message = format!(
            "Translate these {} texts to: {}\n\n{}\n\n",
            self.source_language,
            locale_list(target_locales),
            texts
        );
        if let Some(protected) = &protected {
            user_message.push_str(&format!("Protected words (keep as-is): {}\n\n", protected));
        }
        user_message.push_str(&format!(
            "Respond with ONLY a JSON object:\n{{\n  \"0\": {{ {0} }},\n  \"1\": {{ {0} }}\n}}",
            example_locales
        ));

        Prompt::new(system_message, user_message)
    }

    fn rules_preamble(&self, task: &str, protected: Option<&str>) -> String {
        let mut message = format!(
            "You are a professional translator for a mobile app. {}\n\nCRITICAL RULES:\n\
             1. Preserve ALL formatting specifiers (%@, %d, %lld, %s, etc.) EXACTLY as they appear\n\
             2. Format specifiers MUST remain in the same order in ALL translations\n\
             3. DO NOT translate or modify any format specifiers\n\
             4. Maintain a natural, user-friendly tone",
            task.replace("{source}", &self.source_language)
        );
        if let Some(protected) = protected {
            message.push_str(&format!(
                "\n5. DO NOT translate these words/names, keep them exactly as-is: {}",
                protected
            ));
        }
        message
    }
}

fn next_rule_number(has_protected: bool) -> u8 {
    if has_protected { 6 } else { 5 }
}

fn protected_list(protected_words: &[String]) -> Option<String> {
    let words: Vec<&str> = protected_words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() { None } else { Some(words.join(", ")) }
}

fn locale_list(target_locales: &[String]) -> String {
    target_locales
        .iter()
        .map(|l| language_utils::describe_locale(l))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Quote a text as a JSON string so embedded quotes and newlines stay unambiguous
fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}
