/*!
 * Tests for locale utilities
 */

use locsync::language_utils::{
    SUPPORTED_LOCALES, describe_locale, find_supported, locale_codes_match, primary_subtag,
    prompt_name, validate_locale,
};

#[test]
fn test_supported_locales_should_have_unique_codes() {
    for (i, locale) in SUPPORTED_LOCALES.iter().enumerate() {
        assert!(
            SUPPORTED_LOCALES[i + 1..].iter().all(|other| other.code != locale.code),
            "duplicate locale {}",
            locale.code
        );
        assert!(validate_locale(locale.code).is_ok());
    }
}

#[test]
fn test_find_supported_should_ignore_case() {
    assert_eq!(find_supported("ZH-hans").map(|l| l.code), Some("zh-Hans"));
    assert!(find_supported("fr-CA").is_none());
}

#[test]
fn test_prompt_name_should_fall_back_to_iso_names() {
    assert_eq!(prompt_name("zh-Hans"), "Simplified Chinese");
    assert_eq!(prompt_name("fi"), "Finnish");
    assert_eq!(prompt_name("fr-CA"), "French");
    assert_eq!(prompt_name("x-custom"), "x-custom");
}

#[test]
fn test_describe_locale_should_render_code_and_name() {
    assert_eq!(describe_locale("pt-BR"), "pt-BR (Portuguese (Brazilian))");
    assert_eq!(describe_locale("es"), "es (Spanish)");
}

#[test]
fn test_primary_subtag_should_split_on_dash_and_underscore() {
    assert_eq!(primary_subtag("pt-BR"), "pt");
    assert_eq!(primary_subtag("zh_Hant_TW"), "zh");
    assert_eq!(primary_subtag(" de "), "de");
}

#[test]
fn test_validate_locale_should_reject_unknown_codes() {
    assert!(validate_locale("de-AT").is_ok());
    assert!(validate_locale("").is_err());
    assert!(validate_locale("xx").is_err());
    assert!(validate_locale("english").is_err());
}

#[test]
fn test_locale_codes_match_should_normalize_separators() {
    assert!(locale_codes_match("pt_BR", "pt-br"));
    assert!(locale_codes_match(" en ", "EN"));
    assert!(!locale_codes_match("pt", "pt-BR"));
}
