/*!
 * Provider implementations for the LLM backends used for translation.
 *
 * This module contains client implementations for each backend family:
 * - OpenAI: OpenAI chat completions
 * - Azure: Azure-hosted OpenAI deployments
 * - Bedrock: AWS Bedrock Converse API
 * - GitHub: GitHub Models inference gateway
 * - Anthropic: Anthropic Messages API
 * - Mock: scripted provider for tests
 */

use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{ProviderConfig, TranslationProvider};
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

/// Message sent by `test_connection`
pub const CONNECTION_TEST_MESSAGE: &str = "Say 'API connection successful' in exactly those words.";

/// Generation parameters shared by every backend
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    /// Sampling temperature, for backends that accept one
    pub temperature: Option<f32>,
    /// Upper bound on generated tokens, for backends that require one
    pub max_tokens: u32,
    /// Ask for a JSON object response where the backend supports it
    pub json_mode: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            temperature: Some(0.3),
            max_tokens: 4096,
            json_mode: true,
        }
    }
}

impl RequestOptions {
    /// Options for a short, free-form reply
    pub fn plain_text(max_tokens: u32) -> Self {
        Self {
            temperature: None,
            max_tokens,
            json_mode: false,
        }
    }
}

/// Common trait for all LLM providers
///
/// Each implementation owns its endpoint shape, payload shape and error
/// extraction. Configuration is passed per call and never retained, so one
/// adapter instance can serve several accounts.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Human-readable backend name used in logs
    fn name(&self) -> &str;

    /// Send one system + user message pair and return the assistant's text
    ///
    /// Performs exactly one outbound call; retries belong to the caller.
    async fn send(
        &self,
        prompt: &Prompt,
        config: &ProviderConfig,
        options: &RequestOptions,
    ) -> Result<String, ProviderError>;

    /// Test the connection to the provider with a tiny request
    async fn test_connection(&self, config: &ProviderConfig) -> Result<(), ProviderError> {
        let prompt = Prompt::new("", CONNECTION_TEST_MESSAGE);
        self.send(&prompt, config, &RequestOptions::plain_text(20)).await?;
        Ok(())
    }
}

/// Build the HTTP client shared by the adapters
pub fn build_http_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

/// Create the adapter for a provider family
pub fn create_provider(provider: TranslationProvider, timeout: Duration) -> Arc<dyn Provider> {
    let client = build_http_client(timeout);
    match provider {
        TranslationProvider::OpenAI => Arc::new(openai::OpenAI::new(client)),
        TranslationProvider::Azure => Arc::new(azure::AzureOpenAI::new(client)),
        TranslationProvider::Bedrock => Arc::new(bedrock::Bedrock::new(client)),
        TranslationProvider::GitHub => Arc::new(github::GitHubModels::new(client)),
        TranslationProvider::Anthropic => Arc::new(anthropic::Anthropic::new(client)),
    }
}

/// Shorten a response body so it can be embedded in an error message
pub(crate) fn snippet(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    if body.chars().count() <= MAX_CHARS {
        body.to_string()
    } else {
        body.chars().take(MAX_CHARS).collect()
    }
}

/// Join a configured base URL and a path, tolerating trailing slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub mod anthropic;
pub mod azure;
pub mod bedrock;
pub mod github;
pub mod mock;
pub mod openai;
