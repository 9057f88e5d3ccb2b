/*!
 * Common test utilities for the locsync test suite
 */

use anyhow::Result;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use locsync::app_config::{Config, ProviderConfig, TranslationProvider};

static LOGGER: Once = Once::new();

/// Route library logs to the test output (`RUST_LOG=debug cargo test`)
pub fn init_logger() {
    LOGGER.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Owned locale list from string slices
pub fn locales(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|c| c.to_string()).collect()
}

/// Catalog JSON with the given `(key, english value)` pairs
///
/// Every key also carries an existing German translation, and the document
/// has a top-level field the model does not know about.
pub fn sample_catalog_json(entries: &[(&str, &str)]) -> String {
    let mut strings = serde_json::Map::new();
    for (key, value) in entries {
        strings.insert(
            key.to_string(),
            json!({
                "extractionState": "manual",
                "localizations": {
                    "en": { "stringUnit": { "state": "translated", "value": value } },
                    "de": { "stringUnit": { "state": "translated", "value": format!("DE {}", value) } }
                }
            }),
        );
    }
    let catalog = json!({
        "sourceLanguage": "en",
        "strings": Value::Object(strings),
        "version": "1.0",
        "generator": "test-suite"
    });
    serde_json::to_string_pretty(&catalog).unwrap_or_default()
}

/// Creates a sample string catalog file
pub fn create_test_catalog(dir: &Path, filename: &str) -> Result<PathBuf> {
    let content = sample_catalog_json(&[
        ("greeting", "Hello %@, you have %d messages"),
        ("settings.title", "Settings"),
        ("onboarding.cta", "Get started"),
    ]);
    create_test_file(dir, filename, &content)
}

/// Configuration for tests that inject their own provider
pub fn test_config(targets: &[&str]) -> Config {
    let mut config = Config::default();
    config.target_languages = locales(targets);
    config.translation.common.wave_delay_ms = 0;
    config
        .translation
        .provider_config_mut(TranslationProvider::OpenAI)
        .api_key = "test-key".to_string();
    config
}

/// Provider account pointed at a local mock server
pub fn provider_config_for(provider: TranslationProvider, server_uri: &str) -> ProviderConfig {
    ProviderConfig::new(provider)
        .with_api_key("test-key")
        .with_model("test-model")
        .with_endpoint(server_uri)
}
