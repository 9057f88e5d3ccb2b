/*!
 * Core translation service implementation.
 *
 * `TranslationService` owns a provider adapter and the account it talks to,
 * and offers the one-shot operations used outside of catalog runs: a single
 * text into several locales, a free-form prompt, and a connection check.
 */

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::app_config::{Config, ProviderConfig};
use crate::errors::{ProviderError, TranslationError};
use crate::providers::{self, Provider, RequestOptions};

use super::batch::SchedulerConfig;
use super::pipeline::{TranslationJob, TranslationPipeline};
use super::placeholders;
use super::prompts::{Prompt, PromptBuilder};
use super::response::{self, LocaleTranslations};

/// Token budget for free-form completions
const FREE_FORM_MAX_TOKENS: u32 = 1024;

/// Translation service bound to one provider account
#[derive(Debug, Clone)]
pub struct TranslationService {
    /// Provider implementation
    provider: Arc<dyn Provider>,

    /// Account settings passed to the provider on every call
    provider_config: ProviderConfig,

    /// Generation options for translation calls
    options: RequestOptions,

    /// Prompt builder for the source locale
    prompts: PromptBuilder,

    /// Words echoed verbatim in every locale
    protected_words: Vec<String>,
}

impl TranslationService {
    /// Create a service for an adapter and account
    pub fn new(provider: Arc<dyn Provider>, provider_config: ProviderConfig) -> Self {
        Self {
            provider,
            provider_config,
            options: RequestOptions::default(),
            prompts: PromptBuilder::default(),
            protected_words: Vec::new(),
        }
    }

    /// Create a service for the active provider in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider_config = config.translation.active_provider_config();
        provider_config.validate()?;

        let provider = providers::create_provider(provider_config.provider, config.translation.timeout());
        Ok(Self::new(provider, provider_config)
            .with_request_options(config.translation.common.request_options())
            .with_source_locale(&config.source_language)
            .with_protected_words(config.protected_words.clone()))
    }

    /// Override generation options
    pub fn with_request_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the locale source texts are written in
    pub fn with_source_locale(mut self, source_locale: &str) -> Self {
        self.prompts = PromptBuilder::new(source_locale);
        self
    }

    /// Set protected words
    pub fn with_protected_words(mut self, protected_words: Vec<String>) -> Self {
        self.protected_words = protected_words;
        self
    }

    /// Provider adapter in use
    pub fn provider(&self) -> Arc<dyn Provider> {
        Arc::clone(&self.provider)
    }

    /// Account settings in use
    pub fn provider_config(&self) -> &ProviderConfig {
        &self.provider_config
    }

    /// Check that the provider accepts our credentials
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        info!(
            "Testing connection to {} with model {}",
            self.provider.name(),
            self.provider_config.model
        );
        self.provider.test_connection(&self.provider_config).await
    }

    /// Translate one text into every locale of `target_locales`
    ///
    /// Locales whose translation drops or reorders a format specifier are
    /// left out of the result.
    pub async fn translate_text(
        &self,
        text: &str,
        target_locales: &[String],
    ) -> Result<LocaleTranslations, TranslationError> {
        if text.trim().is_empty() || target_locales.is_empty() {
            return Ok(LocaleTranslations::new());
        }

        let prompt = self.prompts.build_single(text, target_locales, &self.protected_words);
        let raw = self
            .provider
            .send(&prompt, &self.provider_config, &self.options)
            .await?;
        let mut translations = response::parse_single(&raw)?;

        let source_tokens = placeholders::scan(text);
        translations.retain(|locale, candidate| {
            if !target_locales.contains(locale) || candidate.trim().is_empty() {
                return false;
            }
            let valid = placeholders::placeholders_match(&source_tokens, candidate);
            if !valid {
                warn!("Dropping {} translation with mismatched placeholders: {}", locale, candidate);
            }
            valid
        });

        Ok(translations)
    }

    /// Send a free-form prompt and return the reply without code fences
    pub async fn complete_prompt(&self, system_message: &str, user_message: &str) -> Result<String, TranslationError> {
        let options = RequestOptions {
            temperature: self.options.temperature,
            ..RequestOptions::plain_text(FREE_FORM_MAX_TOKENS)
        };
        let prompt = Prompt::new(system_message, user_message);
        let raw = self
            .provider
            .send(&prompt, &self.provider_config, &options)
            .await?;
        Ok(response::strip_code_fences(&raw).to_string())
    }

    /// Pipeline driving this service's provider
    pub fn pipeline(&self) -> TranslationPipeline {
        TranslationPipeline::new(Arc::clone(&self.provider))
    }

    /// Catalog job for this service's account and settings
    pub fn job(&self, target_locales: Vec<String>, scheduler: SchedulerConfig) -> TranslationJob {
        TranslationJob::new(target_locales, self.provider_config.clone())
            .with_protected_words(self.protected_words.clone())
            .with_scheduler_config(scheduler)
            .with_request_options(self.options.clone())
    }
}
