/*!
 * Tests for application configuration functionality
 */

use std::str::FromStr;
use std::time::Duration;

use locsync::TranslationJob;
use locsync::app_config::{Config, LogLevel, TranslationProvider};

/// Test default configuration values
#[test]
fn test_default_config_should_have_catalog_defaults() {
    let config = Config::default();

    assert_eq!(config.source_language, "en");
    assert_eq!(config.target_languages.len(), 20);
    assert_eq!(config.target_languages[0], "fr");
    assert_eq!(config.translation.provider, TranslationProvider::OpenAI);
    assert_eq!(config.translation.available_providers.len(), 5);
    assert_eq!(config.translation.common.batch_size, 5);
    assert_eq!(config.translation.common.concurrent_requests, 10);
    assert_eq!(config.translation.common.wave_delay_ms, 50);
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_should_check_locales_and_credentials() {
    let mut config = Config::default();

    // Default OpenAI account has no key yet
    assert!(config.validate().is_err());
    config.translation.provider_config_mut(TranslationProvider::OpenAI).api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());

    config.source_language = "xx".to_string();
    assert!(config.validate().is_err());
    config.source_language = "en".to_string();

    config.target_languages.clear();
    assert!(config.validate().is_err());
    config.target_languages = vec!["pt-BR".to_string(), "gsw".to_string()];
    assert!(config.validate().is_ok());

    config.translation.common.concurrent_requests = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_minimal_config_file_should_fill_defaults() {
    let config: Config = serde_json::from_str(r#"{"translation": {"provider": "bedrock"}}"#).unwrap();

    assert_eq!(config.source_language, "en");
    assert!(config.translation.available_providers.is_empty());

    let active = config.translation.active_provider_config();
    assert_eq!(active.provider, TranslationProvider::Bedrock);
    assert_eq!(active.region(), Some("us-east-1"));
    assert_eq!(active.model, "global.anthropic.claude-haiku-4-5-20251001-v1:0");
}

#[test]
fn test_provider_names_should_parse_case_insensitively() {
    assert_eq!(TranslationProvider::from_str("OpenAI").unwrap(), TranslationProvider::OpenAI);
    assert_eq!(TranslationProvider::from_str("GITHUB").unwrap(), TranslationProvider::GitHub);
    assert!(TranslationProvider::from_str("deepl").is_err());

    for provider in TranslationProvider::ALL {
        assert_eq!(TranslationProvider::from_str(&provider.to_string()).unwrap(), provider);
    }
}

#[test]
fn test_common_config_should_derive_scheduler_and_request_options() {
    let mut config = Config::default();
    config.translation.common.batch_size = 8;
    config.translation.common.concurrent_requests = 3;
    config.translation.common.wave_delay_ms = 250;
    config.translation.common.json_mode = false;

    let scheduler = config.translation.common.scheduler_config();
    assert_eq!(scheduler.batch_size, 8);
    assert_eq!(scheduler.concurrency, 3);
    assert_eq!(scheduler.wave_delay, Duration::from_millis(250));

    let options = config.translation.common.request_options();
    assert_eq!(options.temperature, Some(0.3));
    assert!(!options.json_mode);
    assert_eq!(config.translation.timeout(), Duration::from_secs(120));
}

#[test]
fn test_translation_job_from_config_should_use_active_provider() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    config.protected_words = vec!["Acme".to_string()];
    config.target_languages = vec!["ja".to_string()];
    config.translation.provider_config_mut(TranslationProvider::Anthropic).api_key = "k".to_string();

    let job = TranslationJob::from_config(&config);

    assert_eq!(job.target_locales, vec!["ja".to_string()]);
    assert_eq!(job.provider_config.provider, TranslationProvider::Anthropic);
    assert_eq!(job.provider_config.api_key, "k");
    assert_eq!(job.protected_words, vec!["Acme".to_string()]);
    assert_eq!(job.scheduler.batch_size, 5);
}

#[test]
fn test_log_level_should_map_to_filter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
