use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::time::Duration;

use crate::language_utils;
use crate::providers::RequestOptions;
use crate::translation::batch::SchedulerConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Locale holding the source text when a catalog does not say otherwise
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Locales to fill in
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Words the model must echo verbatim (brand and product names)
    #[serde(default)]
    pub protected_words: Vec<String>,

    /// Translation config
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI chat completions
    #[default]
    OpenAI,
    // @provider: Azure-hosted OpenAI deployment
    Azure,
    // @provider: AWS Bedrock Converse
    Bedrock,
    // @provider: GitHub Models inference gateway
    GitHub,
    // @provider: Anthropic Messages
    Anthropic,
}

impl TranslationProvider {
    /// Every provider, in the order they are listed to users
    pub const ALL: [TranslationProvider; 5] = [
        Self::OpenAI,
        Self::Azure,
        Self::Bedrock,
        Self::GitHub,
        Self::Anthropic,
    ];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Azure => "Azure OpenAI",
            Self::Bedrock => "AWS Bedrock",
            Self::GitHub => "GitHub Models",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::OpenAI => "openai".to_string(),
            Self::Azure => "azure".to_string(),
            Self::Bedrock => "bedrock".to_string(),
            Self::GitHub => "github".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }

    /// Whether the provider cannot be reached without a user-supplied endpoint
    pub fn needs_endpoint(&self) -> bool {
        matches!(self, Self::Azure)
    }

    /// Whether the provider cannot be reached without a region
    pub fn needs_region(&self) -> bool {
        matches!(self, Self::Bedrock)
    }

    /// Models offered for this provider; the first one is the default
    pub fn suggested_models(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAI => &["gpt-5-mini", "gpt-5-nano-2025-08-07"],
            Self::Azure => &["gpt-5-nano", "gpt-5-mini"],
            Self::Bedrock => &[
                "global.anthropic.claude-haiku-4-5-20251001-v1:0",
                "global.anthropic.claude-sonnet-4-5-20250929-v1:0",
                "global.anthropic.claude-opus-4-5-20251101-v1:0",
            ],
            Self::GitHub => &["gpt-4o-mini", "gpt-4o", "o1-mini", "o1-preview", "Phi-3.5-mini-instruct"],
            Self::Anthropic => &["claude-haiku-4-5", "claude-sonnet-4-5"],
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "azure" => Ok(Self::Azure),
            "bedrock" => Ok(Self::Bedrock),
            "github" => Ok(Self::GitHub),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
///
/// Carried unchanged from the config file to the provider adapter.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider: TranslationProvider,

    // @field: Model or deployment name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key or bearer token
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Cloud region (Bedrock)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    // @field: Service URL (required for Azure, optional override elsewhere)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    // @param provider: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider: TranslationProvider) -> Self {
        Self {
            provider,
            model: default_model(provider),
            api_key: String::new(),
            region: default_region(provider),
            endpoint: default_endpoint(provider),
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Endpoint with empty strings treated as unset
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty())
    }

    /// Region with empty strings treated as unset
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }

    /// Check that the provider can be addressed with this configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(anyhow!("API key is required for {} provider", self.provider.display_name()));
        }
        if self.model.trim().is_empty() {
            return Err(anyhow!("Model is required for {} provider", self.provider.display_name()));
        }
        if self.provider.needs_endpoint() && self.endpoint().is_none() {
            return Err(anyhow!("Endpoint is required for {} provider", self.provider.display_name()));
        }
        if self.provider.needs_region() && self.region().is_none() {
            return Err(anyhow!("Region is required for {} provider", self.provider.display_name()));
        }
        Ok(())
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Number of source strings sent in one provider call
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum number of provider calls in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Pause between waves of concurrent calls, in milliseconds
    #[serde(default = "default_wave_delay_ms")]
    pub wave_delay_ms: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Lower values make output more deterministic, higher values more creative
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens for providers that require one
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Ask OpenAI-style backends for a JSON object response
    #[serde(default = "default_true")]
    pub json_mode: bool,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            concurrent_requests: default_concurrent_requests(),
            wave_delay_ms: default_wave_delay_ms(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            json_mode: default_true(),
        }
    }
}

impl TranslationCommonConfig {
    /// Scheduler tuning derived from these settings
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(
            self.batch_size,
            self.concurrent_requests,
            Duration::from_millis(self.wave_delay_ms),
        )
    }

    /// Per-request generation options derived from these settings
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            temperature: Some(self.temperature),
            max_tokens: self.max_tokens,
            json_mode: self.json_mode,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_languages() -> Vec<String> {
    language_utils::SUPPORTED_LOCALES
        .iter()
        .map(|l| l.code.to_string())
        .collect()
}

fn default_batch_size() -> usize {
    5
}

fn default_concurrent_requests() -> usize {
    10
}

fn default_wave_delay_ms() -> u64 {
    50
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_model(provider: TranslationProvider) -> String {
    provider.suggested_models()[0].to_string()
}

fn default_endpoint(provider: TranslationProvider) -> Option<String> {
    match provider {
        TranslationProvider::OpenAI => Some("https://api.openai.com/v1".to_string()),
        TranslationProvider::GitHub => Some("https://models.inference.ai.azure.com".to_string()),
        TranslationProvider::Anthropic => Some("https://api.anthropic.com".to_string()),
        // Azure resources are per-customer; Bedrock URLs derive from the region
        TranslationProvider::Azure | TranslationProvider::Bedrock => None,
    }
}

fn default_region(provider: TranslationProvider) -> Option<String> {
    match provider {
        TranslationProvider::Bedrock => Some("us-east-1".to_string()),
        _ => None,
    }
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::validate_locale(&self.source_language)?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for locale in &self.target_languages {
            language_utils::validate_locale(locale)?;
        }

        if self.translation.common.batch_size == 0 {
            return Err(anyhow!("batch_size must be greater than zero"));
        }
        if self.translation.common.concurrent_requests == 0 {
            return Err(anyhow!("concurrent_requests must be greater than zero"));
        }

        self.translation.active_provider_config().validate()
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            protected_words: Vec::new(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider: &TranslationProvider) -> Option<&ProviderConfig> {
        self.available_providers.iter().find(|p| p.provider == *provider)
    }

    /// Mutable access to a provider configuration, inserting defaults when absent
    pub fn provider_config_mut(&mut self, provider: TranslationProvider) -> &mut ProviderConfig {
        let index = match self.available_providers.iter().position(|p| p.provider == provider) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(provider));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Active provider configuration with defaults filled in for empty fields
    pub fn active_provider_config(&self) -> ProviderConfig {
        let defaults = ProviderConfig::new(self.provider);
        match self.get_active_provider_config() {
            Some(config) => ProviderConfig {
                provider: self.provider,
                model: if config.model.is_empty() { defaults.model } else { config.model.clone() },
                api_key: config.api_key.clone(),
                region: config.region.clone().or(defaults.region),
                endpoint: config.endpoint.clone().or(defaults.endpoint),
            },
            None => defaults,
        }
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        self.active_provider_config().model
    }

    /// Request timeout for provider calls
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.common.timeout_secs)
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: TranslationProvider::ALL
                .iter()
                .map(|p| ProviderConfig::new(*p))
                .collect(),
            common: TranslationCommonConfig::default(),
        }
    }
}
