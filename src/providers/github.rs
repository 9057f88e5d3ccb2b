use async_trait::async_trait;
use reqwest::Client;

use crate::app_config::ProviderConfig;
use crate::errors::ProviderError;
use crate::translation::prompts::Prompt;

use super::openai::{send_chat_request, ChatCompletionRequest};
use super::{join_url, Provider, RequestOptions};

/// GitHub Models inference gateway
pub const DEFAULT_GITHUB_ENDPOINT: &str = "https://models.inference.ai.azure.com";

/// Client for GitHub Models, an OpenAI-compatible gateway authenticated with a GitHub token
#[derive(Debug, Clone)]
pub struct GitHubModels {
    /// HTTP client for API requests
    client: Client,
}

impl GitHubModels {
    /// Create a new GitHub Models client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Chat completions URL for a configuration
    pub fn chat_url(config: &ProviderConfig) -> String {
        join_url(
            config.endpoint().unwrap_or(DEFAULT_GITHUB_ENDPOINT),
            "chat/completions",
        )
    }
}

#[async_trait]
impl Provider for GitHubModels {
    fn name(&self) -> &str {
        "GitHub Models"
    }

    async fn send(
        &self,
        prompt: &Prompt,
        config: &ProviderConfig,
        _options: &RequestOptions,
    ) -> Result<String, ProviderError> {
        // Several gateway models (o1, Phi) reject response_format, so JSON mode is never requested
        let request = ChatCompletionRequest::from_prompt(&config.model, prompt);

        let builder = self
            .client
            .post(Self::chat_url(config))
            .bearer_auth(&config.api_key);

        send_chat_request(self.name(), builder, &request).await
    }
}
