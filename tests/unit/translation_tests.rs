/*!
 * Tests for placeholder scanning, prompt building and reply parsing
 */

use std::sync::Arc;

use locsync::app_config::{ProviderConfig, TranslationProvider};
use locsync::errors::TranslationError;
use locsync::providers::mock::MockProvider;
use locsync::translation::placeholders::{placeholders_match, scan};
use locsync::translation::prompts::{PromptBuilder, PromptItem};
use locsync::translation::response::{parse_batch, parse_single, strip_code_fences};
use locsync::translation::TranslationService;

use crate::common::locales;

#[test]
fn test_scan_should_keep_positional_specifiers_in_order() {
    let tokens = scan("%1$@ sent %2$lld photos to %3$@");
    assert_eq!(tokens, vec!["%1$@", "%2$lld", "%3$@"]);
    assert!(placeholders_match(&tokens, "%1$@ a envoyé %2$lld photos à %3$@"));
    assert!(!placeholders_match(&tokens, "%3$@ a reçu %2$lld photos de %1$@"));
}

#[test]
fn test_placeholders_match_should_reject_dropped_and_extra_tokens() {
    let tokens = scan("Hello %@, you have %d messages");
    assert!(placeholders_match(&tokens, "Hola %@, tienes %d mensajes"));
    assert!(!placeholders_match(&tokens, "Bonjour %@, vous avez des messages"));
    assert!(!placeholders_match(&tokens, "Bonjour %@ %@, vous avez %d messages"));
    assert!(placeholders_match(&[], "Réglages"));
}

#[test]
fn test_batch_prompt_should_index_items_and_list_locales() {
    let first = scan("Hello %@");
    let prompt = PromptBuilder::new("en").build_batch(
        &[
            PromptItem { text: "Hello %@", placeholders: &first },
            PromptItem { text: "Say \"hi\"", placeholders: &[] },
        ],
        &locales(&["fr", "zh-Hans"]),
        &["Acme".to_string(), " ".to_string()],
    );

    assert!(prompt.system_message.contains("Translate multiple English texts"));
    assert!(prompt.system_message.contains("keep them exactly as-is: Acme"));
    assert!(prompt.user_message.starts_with(
        "Translate these English texts to: fr (French), zh-Hans (Simplified Chinese)\n\n"
    ));
    assert!(prompt.user_message.contains("[0] \"Hello %@\" (preserve: %@)\n"));
    assert!(prompt.user_message.contains("[1] \"Say \\\"hi\\\"\"\n"));
    assert!(prompt.user_message.contains("Protected words (keep as-is): Acme\n"));
}

#[test]
fn test_single_prompt_should_request_translations_object() {
    let prompt = PromptBuilder::new("de").build_single("Hallo %d", &locales(&["fr", "es"]), &[]);

    assert!(prompt.system_message.contains("\"translations\""));
    assert!(!prompt.system_message.contains("DO NOT translate these words"));
    assert!(prompt.user_message.starts_with(
        "Translate this German text to the following languages: fr (French), es (Spanish)"
    ));
    assert!(prompt.user_message.contains("German text: \"Hallo %d\""));
    assert!(prompt.user_message.contains("preserved exactly: %d"));
    assert!(prompt.user_message.contains("ALL 2 requested languages"));
}

#[test]
fn test_parse_batch_should_accept_fenced_and_unfenced_replies() {
    let body = r#"{"0": {"fr": "Bonjour"}, "1": {"fr": "Au revoir"}}"#;
    let fenced = format!("```json\n{}\n```", body);

    let plain = parse_batch(body, 2).unwrap();
    let stripped = parse_batch(&fenced, 2).unwrap();

    assert_eq!(plain, stripped);
    assert_eq!(plain.entries[1]["fr"], "Au revoir");
    assert!(plain.missing_indices.is_empty());

    // The raw fenced text is not JSON on its own
    assert!(serde_json::from_str::<serde_json::Value>(&fenced).is_err());
}

#[test]
fn test_parse_batch_should_treat_absent_indices_as_missing() {
    let response = parse_batch(r#"{"1": {"es": "Hola"}, "2": null}"#, 3).unwrap();
    assert_eq!(response.missing_indices, vec![0, 2]);
    assert!(response.entries[0].is_empty());
    assert_eq!(response.entries[1]["es"], "Hola");
    assert!(response.is_missing(2));
}

#[test]
fn test_parse_replies_should_fail_closed_on_prose() {
    assert!(matches!(
        parse_batch("I could not translate these.", 1),
        Err(TranslationError::MalformedResponse(_))
    ));
    assert!(matches!(parse_batch("\"just a string\"", 1), Err(TranslationError::MalformedResponse(_))));
    assert!(matches!(parse_single("[1, 2]"), Err(TranslationError::MalformedResponse(_))));
}

#[test]
fn test_parse_single_should_keep_edge_whitespace_and_skip_non_strings() {
    let translations = parse_single(r#"{"translations": {"fr": "Total : ", "es": 5}}"#).unwrap();
    assert_eq!(translations.len(), 1);
    assert_eq!(translations["fr"], "Total : ");
    assert!(parse_single("{}").unwrap().is_empty());
}

#[test]
fn test_strip_code_fences_should_handle_bare_and_tagged_fences() {
    assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
    assert_eq!(strip_code_fences("  ```json\n{\"a\":1}\n```  "), "{\"a\":1}");
    assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
}

#[test]
fn test_translate_text_should_parse_fenced_single_reply() {
    let provider = MockProvider::fenced();
    let service = TranslationService::new(
        Arc::new(provider.clone()),
        ProviderConfig::new(TranslationProvider::OpenAI),
    );

    let translations =
        tokio_test::block_on(service.translate_text("Open %@", &locales(&["fr", "ko"]))).unwrap();

    assert_eq!(translations["fr"], "[fr] Open %@");
    assert_eq!(translations["ko"], "[ko] Open %@");
    assert_eq!(provider.request_count(), 1);
}
